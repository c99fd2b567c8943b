//! Diagram composition: the two layouts and the top-level entry points.

use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;
use std::hash::Hash;

use crate::colors::{generate_colors, Palette, Rgba};
use crate::constants::{self, Shape};
use crate::petals::{count_sets, generate_petal_labels, LabelFormat};
use crate::surface::{LegendLoc, Surface, DEFAULT_SIZE};

// Radial six-ellipse arrangement: centers at PSEUDO_RADIUS from the middle,
// 60 degrees apart, set 0 on top.
const PSEUDO_RADIUS: f64 = 0.2;
const PSEUDO_HINT_RADIUS: f64 = 0.57;
const PSEUDO_ELLIPSE_SIZE: f64 = 0.6;

fn pseudo_center(step: usize, radius: f64) -> (f64, f64) {
    let angle = (2.0 - step as f64) * PI / 3.0;
    (0.5 + radius * angle.cos(), 0.5 + radius * angle.sin())
}

fn draw_shape(shape: &Shape, color: Rgba, surface: &mut Surface) {
    let outline = color.less_transparent();
    match shape {
        Shape::Ellipse {
            cx,
            cy,
            width,
            height,
            angle,
        } => surface.ellipse(*cx, *cy, *width, *height, *angle, color, outline),
        Shape::Triangle { points } => surface.polygon(points, color, outline),
    }
}

fn legend_entries(dataset_labels: &[String], colors: &[Rgba]) -> Vec<(String, Rgba)> {
    dataset_labels
        .iter()
        .cloned()
        .zip(colors.iter().copied())
        .collect()
}

/// Draw a true Venn diagram: one shape per dataset from the fixed layout
/// table, petal annotations, and optionally a legend.
///
/// Codes absent from the position table are silently skipped, so callers may
/// prune or override individual petal labels.
pub fn draw_venn(
    petal_labels: &BTreeMap<String, String>,
    dataset_labels: &[String],
    colors: &[Rgba],
    fontsize: f32,
    legend_loc: Option<LegendLoc>,
    mut surface: Surface,
) -> Result<Surface, String> {
    let n_sets = count_sets(petal_labels, dataset_labels.len())?;
    let shapes =
        constants::shapes(n_sets).ok_or("Number of sets must be between 2 and 6")?;
    let coords =
        constants::petal_coords(n_sets).ok_or("Number of sets must be between 2 and 6")?;
    if colors.len() != n_sets {
        return Err(format!(
            "Expected {} colors, one per dataset, got {}",
            n_sets,
            colors.len()
        ));
    }
    for (shape, color) in shapes.iter().zip(colors) {
        draw_shape(shape, *color, &mut surface);
    }
    for (logic, petal_label) in petal_labels {
        if let Some((x, y)) = constants::lookup(coords, logic) {
            surface.text(x, y, petal_label, fontsize);
        }
    }
    if let Some(loc) = legend_loc {
        surface.legend(legend_entries(dataset_labels, colors), loc, fontsize);
    }
    Ok(surface)
}

fn update_hidden(hidden: &mut [u64; 6], logic: &str, size: u64) {
    for (counter, bit) in hidden.iter_mut().zip(logic.bytes()) {
        if bit == b'1' {
            *counter += size;
        }
    }
}

fn hidden_size(logic: &str, petal_label: &str) -> Result<u64, String> {
    petal_label.trim().parse().map_err(|_| {
        format!(
            "Hidden-intersection hints require integer petal labels, got '{}' for code {}",
            petal_label, logic
        )
    })
}

/// Draw the six-set pseudo-Venn diagram: six identical ellipses arranged
/// radially. Not every combination is geometrically realizable; with
/// `hint_hidden`, the sizes of undisplayed combinations are totalled per set
/// and annotated next to its shape.
pub fn draw_pseudovenn6(
    petal_labels: &BTreeMap<String, String>,
    dataset_labels: &[String],
    hint_hidden: bool,
    colors: &[Rgba],
    fontsize: f32,
    legend_loc: Option<LegendLoc>,
    mut surface: Surface,
) -> Result<Surface, String> {
    let n_sets = count_sets(petal_labels, dataset_labels.len())?;
    if n_sets != 6 {
        return Err(format!(
            "The pseudo-Venn layout is only defined for 6 sets, got {}",
            n_sets
        ));
    }
    if colors.len() != n_sets {
        return Err(format!(
            "Expected {} colors, one per dataset, got {}",
            n_sets,
            colors.len()
        ));
    }
    for (step, color) in colors.iter().enumerate() {
        let (x, y) = pseudo_center(step, PSEUDO_RADIUS);
        let shape = Shape::Ellipse {
            cx: x,
            cy: y,
            width: PSEUDO_ELLIPSE_SIZE,
            height: PSEUDO_ELLIPSE_SIZE,
            angle: 0.0,
        };
        draw_shape(&shape, *color, &mut surface);
    }
    let mut hidden = [0u64; 6];
    for (logic, petal_label) in petal_labels {
        if let Some((x, y)) = constants::lookup(constants::PSEUDOVENN_PETAL_COORDS, logic) {
            surface.text(x, y, petal_label, fontsize);
        } else if hint_hidden {
            update_hidden(&mut hidden, logic, hidden_size(logic, petal_label)?);
        }
    }
    if hint_hidden {
        for (step, total) in hidden.iter().enumerate() {
            let (x, y) = pseudo_center(step, PSEUDO_HINT_RADIUS);
            surface.text(x, y, &format!("{}\n n/d*", total), fontsize);
        }
        // make room for the outer annotations and the caption below;
        // SVG clips to the viewBox, so the y-range grows too
        surface.set_xlim(-0.2, 1.05);
        surface.set_ylim(-0.2, 1.05);
        let hint_text = format!(
            "* elements of set in intersections that are not displayed,\nsuch as shared only between {} and {}",
            dataset_labels[0], dataset_labels[3]
        );
        surface.text(0.5, -0.1, &hint_text, fontsize);
    }
    if let Some(loc) = legend_loc {
        surface.legend(legend_entries(dataset_labels, colors), loc, fontsize);
    }
    Ok(surface)
}

/// Options shared by [`venn`] and [`pseudovenn`]; `Default` matches the
/// documented defaults. `hint_hidden` left unset defaults off for the true
/// Venn layout and on for the pseudo-Venn layout.
#[derive(Debug, Clone, Default)]
pub struct VennOptions {
    /// Explicit petal labels; bypasses computation when supplied. Codes need
    /// not cover all combinations.
    pub petal_labels: Option<BTreeMap<String, String>>,
    /// Label template; defaults to `{size}`.
    pub fmt: Option<String>,
    pub hint_hidden: Option<bool>,
    /// Label font size in pixels; defaults to 13.
    pub fontsize: Option<f32>,
    pub palette: Palette,
    /// Fill opacity; defaults to 0.4.
    pub alpha: Option<f64>,
    /// Legend placement; `Some(None)` disables the legend, unset defaults to
    /// the upper right corner.
    pub legend_loc: Option<Option<LegendLoc>>,
    /// An existing surface to draw on; auto-created at the default size when
    /// absent.
    pub surface: Option<Surface>,
}

fn dispatch<T>(
    data: &[(String, HashSet<T>)],
    opts: VennOptions,
    pseudo: bool,
) -> Result<Surface, String>
where
    T: Eq + Hash,
{
    let hint_hidden = opts.hint_hidden.unwrap_or(pseudo);
    let fmt_raw = opts.fmt.as_deref().unwrap_or("{size}");
    let fmt = LabelFormat::parse(fmt_raw)?;
    if pseudo && hint_hidden && !fmt.is_bare_size() {
        return Err(format!(
            "To use fmt='{}', disable hidden-intersection hints",
            fmt_raw
        ));
    }
    // validates the set count up front, before any petal enumeration
    let colors = generate_colors(&opts.palette, data.len(), opts.alpha.unwrap_or(0.4))?;
    let petal_labels = match opts.petal_labels {
        Some(labels) => labels,
        None => {
            let sets: Vec<&HashSet<T>> = data.iter().map(|(_, set)| set).collect();
            generate_petal_labels(&sets, &fmt)?
        }
    };
    let dataset_labels: Vec<String> = data.iter().map(|(label, _)| label.clone()).collect();
    let fontsize = opts.fontsize.unwrap_or(13.0);
    let legend_loc = opts
        .legend_loc
        .unwrap_or(Some(LegendLoc::UpperRight));
    let surface = opts
        .surface
        .unwrap_or_else(|| Surface::new(DEFAULT_SIZE));
    if pseudo {
        draw_pseudovenn6(
            &petal_labels,
            &dataset_labels,
            hint_hidden,
            &colors,
            fontsize,
            legend_loc,
            surface,
        )
    } else {
        draw_venn(
            &petal_labels,
            &dataset_labels,
            &colors,
            fontsize,
            legend_loc,
            surface,
        )
    }
}

/// Draw a Venn diagram for 2 to 6 sets.
pub fn venn<T>(data: &[(String, HashSet<T>)], opts: VennOptions) -> Result<Surface, String>
where
    T: Eq + Hash,
{
    dispatch(data, opts, false)
}

/// Draw a pseudo-Venn diagram for exactly 6 sets.
pub fn pseudovenn<T>(data: &[(String, HashSet<T>)], opts: VennOptions) -> Result<Surface, String>
where
    T: Eq + Hash,
{
    dispatch(data, opts, true)
}
