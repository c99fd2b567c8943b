//! Petal arithmetic: for N sets, the size of every exact
//! intersection/exclusion combination, keyed by logic code.
//!
//! A logic code is a binary string of length N, one char per set in dataset
//! order: '1' means the set is included in the intersection, '0' that it is
//! excluded. The 2^N - 1 non-zero codes enumerate the diagram's petals.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Petal label template. Recognized fields: `{logic}`, `{size}` and
/// `{percentage}`; the latter admits a precision spec (`{percentage:.1}`).
#[derive(Debug, Clone)]
pub struct LabelFormat {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Logic,
    Size,
    Percentage(Option<usize>),
}

impl LabelFormat {
    pub fn parse(template: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();
        while let Some(c) = chars.next() {
            if c != '{' {
                literal.push(c);
                continue;
            }
            let field: String = chars.by_ref().take_while(|&c| c != '}').collect();
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(match field.as_str() {
                "logic" => Segment::Logic,
                "size" => Segment::Size,
                "percentage" => Segment::Percentage(None),
                other => match other.strip_prefix("percentage:.") {
                    Some(digits) => {
                        let precision = digits.parse().map_err(|_| {
                            format!("Invalid precision in label field '{{{}}}'", other)
                        })?;
                        Segment::Percentage(Some(precision))
                    }
                    None => return Err(format!("Unknown label field '{{{}}}'", other)),
                },
            });
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// Whether the template is the default bare `{size}`; hidden-intersection
    /// hints are only supported for this form.
    pub fn is_bare_size(&self) -> bool {
        self.raw == "{size}"
    }

    fn apply(&self, logic: &str, size: usize, percentage: f64) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Logic => out.push_str(logic),
                Segment::Size => out.push_str(&size.to_string()),
                Segment::Percentage(None) => out.push_str(&percentage.to_string()),
                Segment::Percentage(Some(p)) => {
                    out.push_str(&format!("{:.prec$}", percentage, prec = *p))
                }
            }
        }
        out
    }
}

impl Default for LabelFormat {
    fn default() -> Self {
        Self::parse("{size}").expect("default template must parse")
    }
}

/// Size of every petal, keyed by logic code, plus the universe size.
///
/// For each non-zero code, the petal is the universe restricted to elements
/// present in every included set and absent from every excluded set.
pub fn petal_sizes<T>(datasets: &[&HashSet<T>]) -> (BTreeMap<String, usize>, usize)
where
    T: Eq + Hash,
{
    let n_sets = datasets.len();
    let universe: HashSet<&T> = datasets.iter().flat_map(|set| set.iter()).collect();
    let mut sizes = BTreeMap::new();
    for i in 1u32..(1 << n_sets) {
        let logic = format!("{:0width$b}", i, width = n_sets);
        let mut petal = universe.clone();
        for (set, bit) in datasets.iter().zip(logic.bytes()) {
            if bit == b'1' {
                petal.retain(|element| set.contains(*element));
            } else {
                petal.retain(|element| !set.contains(*element));
            }
        }
        sizes.insert(logic, petal.len());
    }
    (sizes, universe.len())
}

/// Generate a formatted label for every non-zero logic code.
///
/// An all-empty dataset family is rejected: with an empty universe there is
/// nothing to draw and percentages are undefined.
pub fn generate_petal_labels<T>(
    datasets: &[&HashSet<T>],
    fmt: &LabelFormat,
) -> Result<BTreeMap<String, String>, String>
where
    T: Eq + Hash,
{
    let (sizes, universe_size) = petal_sizes(datasets);
    if universe_size == 0 {
        return Err("Cannot label petals: all datasets are empty".to_string());
    }
    Ok(sizes
        .into_iter()
        .map(|(logic, size)| {
            let percentage = 100.0 * size as f64 / universe_size as f64;
            let label = fmt.apply(&logic, size, percentage);
            (logic, label)
        })
        .collect())
}

/// Confirm that every logic code matches the dataset count, returning it.
pub fn count_sets(
    petal_labels: &BTreeMap<String, String>,
    n_datasets: usize,
) -> Result<usize, String> {
    for logic in petal_labels.keys() {
        if logic.len() != n_datasets {
            return Err(format!(
                "Inconsistent petal and dataset labels: code '{}' has length {}, expected {}",
                logic,
                logic.len(),
                n_datasets
            ));
        }
        if !logic.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(format!(
                "Logic code '{}' contains characters other than '0' and '1'",
                logic
            ));
        }
    }
    Ok(n_datasets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(elements: &[u32]) -> HashSet<u32> {
        elements.iter().copied().collect()
    }

    #[test]
    fn disjoint_sets_have_empty_overlaps() {
        let a = set(&[1, 2]);
        let b = set(&[3, 4]);
        let c = set(&[5]);
        let (sizes, universe) = petal_sizes(&[&a, &b, &c]);
        assert_eq!(universe, 5);
        for (logic, size) in &sizes {
            let weight = logic.bytes().filter(|&b| b == b'1').count();
            if weight > 1 {
                assert_eq!(*size, 0, "petal {} should be empty", logic);
            }
        }
        assert_eq!(sizes["100"], 2);
        assert_eq!(sizes["010"], 2);
        assert_eq!(sizes["001"], 1);
    }

    #[test]
    fn identical_sets_concentrate_in_full_intersection() {
        let a = set(&[1, 2, 3]);
        let b = a.clone();
        let c = a.clone();
        let (sizes, _) = petal_sizes(&[&a, &b, &c]);
        for (logic, size) in &sizes {
            if logic == "111" {
                assert_eq!(*size, 3);
            } else {
                assert_eq!(*size, 0, "petal {} should be empty", logic);
            }
        }
    }

    #[test]
    fn petal_sizes_partition_the_universe() {
        let a = set(&[1, 2, 3, 4]);
        let b = set(&[3, 4, 5]);
        let c = set(&[1, 4, 5, 6, 7]);
        let d = set(&[7, 8]);
        let (sizes, universe) = petal_sizes(&[&a, &b, &c, &d]);
        assert_eq!(sizes.len(), 15);
        assert_eq!(sizes.values().sum::<usize>(), universe);
    }

    #[test]
    fn percentage_of_two_set_overlap() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4]);
        let fmt = LabelFormat::parse("{percentage}").unwrap();
        let labels = generate_petal_labels(&[&a, &b], &fmt).unwrap();
        assert_eq!(labels["11"], "50");
        let fmt = LabelFormat::parse("{percentage:.1}").unwrap();
        let labels = generate_petal_labels(&[&a, &b], &fmt).unwrap();
        assert_eq!(labels["11"], "50.0");
        assert_eq!(labels["10"], "25.0");
    }

    #[test]
    fn three_set_example_counts() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4]);
        let c = set(&[3, 4, 5]);
        let labels = generate_petal_labels(&[&a, &b, &c], &LabelFormat::default()).unwrap();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels["111"], "1");
        assert_eq!(labels["100"], "1");
        assert_eq!(labels["110"], "1");
        assert_eq!(labels["011"], "1");
        assert_eq!(labels["001"], "1");
    }

    #[test]
    fn combined_template_fields() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4]);
        let fmt = LabelFormat::parse("{logic}: {size} ({percentage:.0}%)").unwrap();
        let labels = generate_petal_labels(&[&a, &b], &fmt).unwrap();
        assert_eq!(labels["11"], "11: 2 (50%)");
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(LabelFormat::parse("{sizes}").is_err());
        assert!(LabelFormat::parse("{percentage:.x}").is_err());
    }

    #[test]
    fn empty_universe_is_an_error() {
        let a: HashSet<u32> = HashSet::new();
        let b: HashSet<u32> = HashSet::new();
        assert!(generate_petal_labels(&[&a, &b], &LabelFormat::default()).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn set_families() -> impl Strategy<Value = Vec<HashSet<u8>>> {
            proptest::collection::vec(proptest::collection::hash_set(any::<u8>(), 0..20), 2..=6)
        }

        proptest! {
            #[test]
            fn sizes_partition_the_universe(family in set_families()) {
                let refs: Vec<&HashSet<u8>> = family.iter().collect();
                let (sizes, universe) = petal_sizes(&refs);
                prop_assert_eq!(sizes.len(), (1usize << family.len()) - 1);
                prop_assert_eq!(sizes.values().sum::<usize>(), universe);
            }

            #[test]
            fn every_code_matches_the_family_size(family in set_families()) {
                let refs: Vec<&HashSet<u8>> = family.iter().collect();
                let (sizes, _) = petal_sizes(&refs);
                for logic in sizes.keys() {
                    prop_assert_eq!(logic.len(), family.len());
                    prop_assert!(logic.bytes().all(|b| b == b'0' || b == b'1'));
                }
            }
        }
    }

    #[test]
    fn count_sets_validates_codes() {
        let mut labels = BTreeMap::new();
        labels.insert("110".to_string(), "1".to_string());
        labels.insert("011".to_string(), "2".to_string());
        assert_eq!(count_sets(&labels, 3).unwrap(), 3);
        assert!(count_sets(&labels, 4).is_err());
        labels.insert("1x0".to_string(), "3".to_string());
        assert!(count_sets(&labels, 3).is_err());
    }
}
