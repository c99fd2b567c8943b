//! Set colors: parsing, colormap sampling and per-diagram color generation.

/// RGBA color with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Outline variant of a fill color: alpha bumped to (1 + a) / 2.
    pub fn less_transparent(self) -> Self {
        Self {
            a: (1.0 + self.a) / 2.0,
            ..self
        }
    }

    /// CSS hex form without alpha; opacity is emitted as a separate attribute.
    pub fn hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

// Subset of the CSS named colors; enough for explicit color lists.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0x00, 0x00, 0x00)),
    ("white", (0xff, 0xff, 0xff)),
    ("red", (0xff, 0x00, 0x00)),
    ("green", (0x00, 0x80, 0x00)),
    ("blue", (0x00, 0x00, 0xff)),
    ("yellow", (0xff, 0xff, 0x00)),
    ("orange", (0xff, 0xa5, 0x00)),
    ("purple", (0x80, 0x00, 0x80)),
    ("magenta", (0xff, 0x00, 0xff)),
    ("cyan", (0x00, 0xff, 0xff)),
    ("brown", (0xa5, 0x2a, 0x2a)),
    ("pink", (0xff, 0xc0, 0xcb)),
    ("gray", (0x80, 0x80, 0x80)),
    ("grey", (0x80, 0x80, 0x80)),
    ("olive", (0x80, 0x80, 0x00)),
    ("teal", (0x00, 0x80, 0x80)),
    ("navy", (0x00, 0x00, 0x80)),
];

fn hex_pair(s: &str) -> Option<f64> {
    u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0)
}

/// Parse a color specification: `#rgb`, `#rrggbb`, `#rrggbbaa` or a CSS name.
pub fn parse_color(spec: &str) -> Result<Rgba, String> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let mut channels = [0.0; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c
                        .to_digit(16)
                        .ok_or_else(|| format!("Invalid hex color '{}'", spec))?;
                    channels[i] = (v * 17) as f64 / 255.0;
                }
                Ok(Rgba::opaque(channels[0], channels[1], channels[2]))
            }
            6 | 8 => {
                let r = hex_pair(&hex[0..2]);
                let g = hex_pair(&hex[2..4]);
                let b = hex_pair(&hex[4..6]);
                let a = if hex.len() == 8 {
                    hex_pair(&hex[6..8])
                } else {
                    Some(1.0)
                };
                match (r, g, b, a) {
                    (Some(r), Some(g), Some(b), Some(a)) => Ok(Rgba { r, g, b, a }),
                    _ => Err(format!("Invalid hex color '{}'", spec)),
                }
            }
            _ => Err(format!("Invalid hex color '{}'", spec)),
        };
    }
    let lower = spec.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|&(_, (r, g, b))| {
            Rgba::opaque(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
        })
        .ok_or_else(|| format!("Unknown color '{}'", spec))
}

// Evenly spaced control points over [0, 1]; sampled by linear interpolation.
const VIRIDIS: &[(f64, f64, f64)] = &[
    (0.267, 0.005, 0.329),
    (0.283, 0.141, 0.458),
    (0.254, 0.265, 0.530),
    (0.207, 0.372, 0.553),
    (0.128, 0.567, 0.551),
    (0.135, 0.659, 0.518),
    (0.267, 0.749, 0.441),
    (0.565, 0.844, 0.273),
    (0.993, 0.906, 0.144),
];

const PLASMA: &[(f64, f64, f64)] = &[
    (0.050, 0.030, 0.528),
    (0.294, 0.012, 0.631),
    (0.494, 0.012, 0.658),
    (0.665, 0.139, 0.586),
    (0.798, 0.280, 0.470),
    (0.899, 0.422, 0.361),
    (0.973, 0.585, 0.252),
    (0.996, 0.766, 0.160),
    (0.940, 0.975, 0.131),
];

const INFERNO: &[(f64, f64, f64)] = &[
    (0.001, 0.000, 0.014),
    (0.107, 0.047, 0.254),
    (0.342, 0.062, 0.429),
    (0.551, 0.120, 0.408),
    (0.729, 0.216, 0.330),
    (0.866, 0.350, 0.207),
    (0.954, 0.517, 0.050),
    (0.988, 0.726, 0.170),
    (0.988, 0.998, 0.645),
];

const COOLWARM: &[(f64, f64, f64)] = &[
    (0.230, 0.299, 0.754),
    (0.552, 0.690, 0.996),
    (0.865, 0.865, 0.865),
    (0.958, 0.603, 0.482),
    (0.706, 0.016, 0.150),
];

const COLORMAPS: &[(&str, &[(f64, f64, f64)])] = &[
    ("viridis", VIRIDIS),
    ("plasma", PLASMA),
    ("inferno", INFERNO),
    ("coolwarm", COOLWARM),
];

fn colormap(name: &str) -> Result<&'static [(f64, f64, f64)], String> {
    let normalized = name.trim().to_ascii_lowercase();
    COLORMAPS
        .iter()
        .find(|(n, _)| *n == normalized)
        .map(|(_, stops)| *stops)
        .ok_or_else(|| {
            format!(
                "Unknown colormap '{}'. Available: {}",
                name,
                COLORMAPS
                    .iter()
                    .map(|(n, _)| *n)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
}

/// Sample a colormap at `t` in [0, 1].
fn sample(stops: &[(f64, f64, f64)], t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let pos = t * (stops.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    let (r0, g0, b0) = stops[lo];
    let (r1, g1, b1) = stops[hi];
    Rgba::opaque(
        r0 + (r1 - r0) * frac,
        g0 + (g1 - g0) * frac,
        b0 + (b1 - b0) * frac,
    )
}

/// Color source for a diagram: a named colormap, or explicit per-set colors.
#[derive(Debug, Clone)]
pub enum Palette {
    Map(String),
    List(Vec<String>),
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Map("viridis".to_string())
    }
}

/// Produce one translucent fill color per set, index-aligned with the
/// dataset order. A colormap is sampled at `n_colors` evenly spaced points;
/// an explicit list is parsed and its first `n_colors` entries used.
pub fn generate_colors(palette: &Palette, n_colors: usize, alpha: f64) -> Result<Vec<Rgba>, String> {
    if !(2..=6).contains(&n_colors) {
        return Err(format!(
            "n_colors must be between 2 and 6, got {}",
            n_colors
        ));
    }
    let colors = match palette {
        Palette::Map(name) => {
            let stops = colormap(name)?;
            (0..n_colors)
                .map(|i| sample(stops, i as f64 / (n_colors - 1) as f64).with_alpha(alpha))
                .collect()
        }
        Palette::List(specs) => {
            if specs.len() < n_colors {
                return Err(format!(
                    "Color list has {} entries but {} sets were given",
                    specs.len(),
                    n_colors
                ));
            }
            specs[..n_colors]
                .iter()
                .map(|spec| parse_color(spec).map(|c| c.with_alpha(alpha)))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_three_colors_with_alpha() {
        let colors = generate_colors(&Palette::default(), 3, 0.4).unwrap();
        assert_eq!(colors.len(), 3);
        for color in &colors {
            assert_eq!(color.a, 0.4);
        }
    }

    #[test]
    fn rejects_out_of_range_counts() {
        assert!(generate_colors(&Palette::default(), 1, 0.4).is_err());
        assert!(generate_colors(&Palette::default(), 7, 0.4).is_err());
    }

    #[test]
    fn explicit_list_is_parsed_and_truncated() {
        let palette = Palette::List(vec![
            "#ff0000".to_string(),
            "green".to_string(),
            "#00f".to_string(),
        ]);
        let colors = generate_colors(&palette, 2, 0.5).unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].hex(), "#ff0000");
        assert_eq!(colors[1].hex(), "#008000");
        assert_eq!(colors[0].a, 0.5);
    }

    #[test]
    fn explicit_list_too_short_is_an_error() {
        let palette = Palette::List(vec!["red".to_string()]);
        assert!(generate_colors(&palette, 3, 0.4).is_err());
    }

    #[test]
    fn unknown_colormap_and_color_are_errors() {
        assert!(generate_colors(&Palette::Map("magma_oops".to_string()), 3, 0.4).is_err());
        assert!(parse_color("not-a-color").is_err());
        assert!(parse_color("#12345").is_err());
    }

    #[test]
    fn hex_with_alpha_channel() {
        let c = parse_color("#ff000080").unwrap();
        assert_eq!(c.hex(), "#ff0000");
        assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn less_transparent_bumps_alpha() {
        let c = Rgba::opaque(0.1, 0.2, 0.3).with_alpha(0.4);
        assert!((c.less_transparent().a - 0.7).abs() < 1e-9);
    }

    #[test]
    fn colormap_endpoints_hit_first_and_last_stop() {
        let colors = generate_colors(&Palette::default(), 2, 1.0).unwrap();
        // viridis runs dark purple to yellow
        assert!(colors[0].b > colors[0].g);
        assert!(colors[1].r > 0.9 && colors[1].g > 0.9);
    }
}
