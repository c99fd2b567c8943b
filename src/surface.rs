//! The drawing surface: shapes and annotations in unit diagram coordinates,
//! serialized to a standalone SVG document.
//!
//! Coordinates are transformed to pixels only at serialization time. The
//! surface keeps an equal aspect ratio: pixel height is fixed and width
//! follows the x-range, so widening the limits widens the image.

use crate::colors::Rgba;

pub const DEFAULT_SIZE: f32 = 600.0;

const TEXT_COLOR: &str = "#333333";
const LINE_HEIGHT_EM: f64 = 1.2;
const LEGEND_MARGIN: f64 = 10.0;
const LEGEND_PADDING: f64 = 8.0;
const LEGEND_SWATCH: f64 = 12.0;

/// Legend placement, or `None` at the call site to disable the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendLoc {
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

impl LegendLoc {
    /// Parse a placement identifier; `"none"` disables the legend.
    pub fn parse(value: &str) -> Result<Option<Self>, String> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "none" => Ok(None),
            "upper-right" => Ok(Some(Self::UpperRight)),
            "upper-left" => Ok(Some(Self::UpperLeft)),
            "lower-right" => Ok(Some(Self::LowerRight)),
            "lower-left" => Ok(Some(Self::LowerLeft)),
            _ => Err(format!(
                "Unknown legend location '{}'. Available: upper-right, upper-left, lower-right, lower-left, none",
                value
            )),
        }
    }
}

#[derive(Debug, Clone)]
enum Element {
    Ellipse {
        cx: f64,
        cy: f64,
        width: f64,
        height: f64,
        angle: f64,
        fill: Rgba,
        stroke: Rgba,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Rgba,
        stroke: Rgba,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        fontsize: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Surface {
    elements: Vec<Element>,
    legend: Option<(LegendLoc, Vec<(String, Rgba)>, f32)>,
    xlim: (f64, f64),
    ylim: (f64, f64),
    height: f32,
    background: String,
    font_family: String,
}

impl Surface {
    /// A square surface with the diagram limits pre-set: equal aspect,
    /// both axes spanning (-0.05, 1.05).
    pub fn new(height: f32) -> Self {
        Self {
            elements: Vec::new(),
            legend: None,
            xlim: (-0.05, 1.05),
            ylim: (-0.05, 1.05),
            height,
            background: "#ffffff".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.xlim = (lo, hi);
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.ylim = (lo, hi);
    }

    pub fn ellipse(&mut self, cx: f64, cy: f64, width: f64, height: f64, angle: f64, fill: Rgba, stroke: Rgba) {
        self.elements.push(Element::Ellipse {
            cx,
            cy,
            width,
            height,
            angle,
            fill,
            stroke,
        });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: Rgba, stroke: Rgba) {
        self.elements.push(Element::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    /// Text centered on (x, y); embedded newlines produce stacked lines.
    pub fn text(&mut self, x: f64, y: f64, content: &str, fontsize: f32) {
        self.elements.push(Element::Text {
            x,
            y,
            content: content.to_string(),
            fontsize,
        });
    }

    pub fn legend(&mut self, entries: Vec<(String, Rgba)>, loc: LegendLoc, fontsize: f32) {
        self.legend = Some((loc, entries, fontsize));
    }

    /// Pixel size under the current limits; width follows the x-span.
    pub fn pixel_size(&self) -> (f64, f64) {
        let scale = self.height as f64 / (self.ylim.1 - self.ylim.0);
        ((self.xlim.1 - self.xlim.0) * scale, self.height as f64)
    }

    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.height as f64 / (self.ylim.1 - self.ylim.0);
        ((x - self.xlim.0) * scale, (self.ylim.1 - y) * scale)
    }

    pub fn to_svg(&self) -> String {
        let (width, height) = self.pixel_size();
        let scale = height / (self.ylim.1 - self.ylim.0);
        let mut svg = format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
                "\n",
                r#"<rect width="{w:.0}" height="{h:.0}" fill="{bg}"/>"#,
                "\n"
            ),
            w = width,
            h = height,
            bg = self.background,
        );

        for element in &self.elements {
            match element {
                Element::Ellipse {
                    cx,
                    cy,
                    width: w,
                    height: h,
                    angle,
                    fill,
                    stroke,
                } => {
                    let (px, py) = self.to_px(*cx, *cy);
                    let rx = w / 2.0 * scale;
                    let ry = h / 2.0 * scale;
                    // data angles are counter-clockwise; the pixel frame has
                    // y flipped, so the SVG rotation is negated
                    let transform = if *angle != 0.0 {
                        format!(r#" transform="rotate({:.2} {:.2} {:.2})""#, -angle, px, py)
                    } else {
                        String::new()
                    };
                    svg.push_str(&format!(
                        r#"<ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" fill="{}" fill-opacity="{}" stroke="{}" stroke-opacity="{}" stroke-width="1"{}/>"#,
                        px, py, rx, ry,
                        fill.hex(), fill.a, stroke.hex(), stroke.a,
                        transform
                    ));
                    svg.push('\n');
                }
                Element::Polygon {
                    points,
                    fill,
                    stroke,
                } => {
                    let pts = points
                        .iter()
                        .map(|&(x, y)| {
                            let (px, py) = self.to_px(x, y);
                            format!("{:.2},{:.2}", px, py)
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    svg.push_str(&format!(
                        r#"<polygon points="{}" fill="{}" fill-opacity="{}" stroke="{}" stroke-opacity="{}" stroke-width="1"/>"#,
                        pts,
                        fill.hex(),
                        fill.a,
                        stroke.hex(),
                        stroke.a
                    ));
                    svg.push('\n');
                }
                Element::Text {
                    x,
                    y,
                    content,
                    fontsize,
                } => {
                    let (px, py) = self.to_px(*x, *y);
                    svg.push_str(&self.render_text(px, py, content, *fontsize));
                }
            }
        }

        if let Some((loc, entries, fontsize)) = &self.legend {
            svg.push_str(&self.render_legend(*loc, entries, *fontsize, width, height));
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn render_text(&self, px: f64, py: f64, content: &str, fontsize: f32) -> String {
        let open = format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle" dominant-baseline="central">"#,
            px, py, self.font_family, fontsize, TEXT_COLOR
        );
        let lines: Vec<&str> = content.split('\n').collect();
        if lines.len() == 1 {
            return format!("{}{}</text>\n", open, escape_xml(content));
        }
        let mut svg = open;
        for (i, line) in lines.iter().enumerate() {
            let dy = if i == 0 {
                -(lines.len() as f64 - 1.0) * LINE_HEIGHT_EM / 2.0
            } else {
                LINE_HEIGHT_EM
            };
            svg.push_str(&format!(
                r#"<tspan x="{:.2}" dy="{:.2}em">{}</tspan>"#,
                px,
                dy,
                escape_xml(line)
            ));
        }
        svg.push_str("</text>\n");
        svg
    }

    fn render_legend(
        &self,
        loc: LegendLoc,
        entries: &[(String, Rgba)],
        fontsize: f32,
        width: f64,
        height: f64,
    ) -> String {
        let fontsize = fontsize as f64;
        let row_height = fontsize * 1.5;
        // rough width estimate, no text measurement
        let longest = entries
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let box_width = LEGEND_PADDING * 2.0 + LEGEND_SWATCH + 6.0 + longest * fontsize * 0.62;
        let box_height = LEGEND_PADDING * 2.0 + row_height * entries.len() as f64;

        let x0 = match loc {
            LegendLoc::UpperRight | LegendLoc::LowerRight => width - LEGEND_MARGIN - box_width,
            LegendLoc::UpperLeft | LegendLoc::LowerLeft => LEGEND_MARGIN,
        };
        let y0 = match loc {
            LegendLoc::UpperRight | LegendLoc::UpperLeft => LEGEND_MARGIN,
            LegendLoc::LowerRight | LegendLoc::LowerLeft => height - LEGEND_MARGIN - box_height,
        };

        let mut svg = format!(
            r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="#ffffff" fill-opacity="0.8" stroke="#999999" stroke-width="1" rx="3"/>"##,
            x0, y0, box_width, box_height
        );
        svg.push('\n');
        for (i, (label, color)) in entries.iter().enumerate() {
            let row_y = y0 + LEGEND_PADDING + row_height * i as f64;
            let swatch_y = row_y + (row_height - LEGEND_SWATCH) / 2.0;
            svg.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{}" stroke="{}" stroke-opacity="{}" stroke-width="1"/>"#,
                x0 + LEGEND_PADDING,
                swatch_y,
                LEGEND_SWATCH,
                LEGEND_SWATCH,
                color.hex(),
                color.a,
                color.hex(),
                color.less_transparent().a,
            ));
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" dominant-baseline="central">{}</text>"#,
                x0 + LEGEND_PADDING + LEGEND_SWATCH + 6.0,
                row_y + row_height / 2.0,
                self.font_family,
                fontsize,
                TEXT_COLOR,
                escape_xml(label)
            ));
            svg.push('\n');
        }
        svg
    }
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Rgba;

    #[test]
    fn unit_center_maps_to_pixel_center() {
        let mut surface = Surface::new(600.0);
        surface.text(0.5, 0.5, "mid", 13.0);
        let svg = surface.to_svg();
        assert!(svg.contains(r#"x="300.00" y="300.00""#), "{}", svg);
    }

    #[test]
    fn widening_xlim_widens_the_image() {
        let mut surface = Surface::new(600.0);
        let (w0, _) = surface.pixel_size();
        surface.set_xlim(-0.2, 1.05);
        let (w1, h1) = surface.pixel_size();
        assert!(w1 > w0);
        assert_eq!(h1, 600.0);
    }

    #[test]
    fn shapes_and_text_are_serialized() {
        let fill = Rgba::opaque(0.5, 0.2, 0.1).with_alpha(0.4);
        let mut surface = Surface::new(400.0);
        surface.ellipse(0.5, 0.5, 0.5, 0.3, 40.0, fill, fill.less_transparent());
        surface.polygon(&[(0.1, 0.1), (0.9, 0.1), (0.5, 0.9)], fill, fill.less_transparent());
        surface.text(0.5, 0.2, "7", 13.0);
        let svg = surface.to_svg();
        assert_eq!(svg.matches("<ellipse").count(), 1);
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert_eq!(svg.matches("<text").count(), 1);
        assert!(svg.contains(r#"rotate(-40.00"#));
        assert!(svg.contains("fill-opacity=\"0.4\""));
    }

    #[test]
    fn multiline_text_uses_tspans() {
        let mut surface = Surface::new(400.0);
        surface.text(0.5, 0.5, "12\n n/d*", 13.0);
        let svg = surface.to_svg();
        assert_eq!(svg.matches("<tspan").count(), 2);
    }

    #[test]
    fn legend_renders_one_row_per_entry() {
        let color = Rgba::opaque(0.1, 0.2, 0.3).with_alpha(0.4);
        let mut surface = Surface::new(400.0);
        surface.legend(
            vec![("A".to_string(), color), ("B".to_string(), color)],
            LegendLoc::UpperRight,
            13.0,
        );
        let svg = surface.to_svg();
        // legend box + two swatches
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains(">A</text>"));
        assert!(svg.contains(">B</text>"));
    }

    #[test]
    fn legend_location_parsing() {
        assert_eq!(LegendLoc::parse("upper-right").unwrap(), Some(LegendLoc::UpperRight));
        assert_eq!(LegendLoc::parse("lower_left").unwrap(), Some(LegendLoc::LowerLeft));
        assert_eq!(LegendLoc::parse("none").unwrap(), None);
        assert!(LegendLoc::parse("center").is_err());
    }

    #[test]
    fn escape_special_xml_chars() {
        assert_eq!(escape_xml(r#"a<b&"c""#), "a&lt;b&amp;&quot;c&quot;");
    }
}
