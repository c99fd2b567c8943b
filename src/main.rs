use clap::Parser;
use resvg::usvg;
use std::collections::HashSet;
use std::path::PathBuf;
use tiny_skia::{Pixmap, Transform};
use vennd::colors::Palette;
use vennd::diagram::{pseudovenn, venn, VennOptions};
use vennd::surface::{LegendLoc, Surface};

/// A pure Rust Venn diagram renderer
#[derive(Parser, Debug)]
#[command(name = "vennd")]
#[command(version)]
#[command(about = "Render Venn and pseudo-Venn diagrams to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Input JSON file mapping set labels to element arrays (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Draw the six-set pseudo-Venn layout instead of a true Venn diagram
    #[arg(long)]
    pseudo: bool,

    /// Keep only the first N sets from the input
    #[arg(long, value_name = "N")]
    take: Option<usize>,

    /// Colormap name (viridis, plasma, inferno, coolwarm) or a
    /// comma-separated list of explicit colors
    #[arg(long, default_value = "viridis")]
    cmap: String,

    /// Fill opacity for set shapes
    #[arg(long, default_value_t = 0.4)]
    alpha: f64,

    /// Label font size in pixels
    #[arg(long, default_value_t = 13.0)]
    fontsize: f32,

    /// Petal label template with {logic}, {size} and {percentage} fields
    #[arg(long, value_name = "TEMPLATE")]
    fmt: Option<String>,

    /// Legend placement: upper-right, upper-left, lower-right, lower-left or none
    #[arg(long, default_value = "upper-right")]
    legend: String,

    /// Annotate hidden intersections (pseudo-Venn only; on by default there)
    #[arg(long, conflicts_with = "no_hint_hidden")]
    hint_hidden: bool,

    /// Disable hidden-intersection annotations
    #[arg(long)]
    no_hint_hidden: bool,

    /// Output image height in pixels
    #[arg(long, default_value_t = 600.0)]
    size: f32,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let json = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let mut data = parse_datasets(&json)?;
    if let Some(n) = args.take {
        data.truncate(n);
    }

    let palette = if args.cmap.contains(',') || args.cmap.starts_with('#') {
        Palette::List(args.cmap.split(',').map(|s| s.trim().to_string()).collect())
    } else {
        Palette::Map(args.cmap.clone())
    };
    let hint_hidden = if args.hint_hidden {
        Some(true)
    } else if args.no_hint_hidden {
        Some(false)
    } else {
        None
    };

    let opts = VennOptions {
        fmt: args.fmt.clone(),
        hint_hidden,
        fontsize: Some(args.fontsize),
        palette,
        alpha: Some(args.alpha),
        legend_loc: Some(LegendLoc::parse(&args.legend)?),
        surface: Some(Surface::new(args.size)),
        ..VennOptions::default()
    };

    let surface = if args.pseudo {
        pseudovenn(&data, opts)?
    } else {
        venn(&data, opts)?
    };
    let svg = surface.to_svg();

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(&args.output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", args.output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", args.output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(&args.output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", args.output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    Ok(())
}

/// Parse the datasets file: a JSON object mapping set labels to element
/// arrays. Key order is preserved and becomes the legend order. Elements are
/// compared by value; non-string scalars are canonicalized to their JSON
/// text.
fn parse_datasets(json: &str) -> Result<Vec<(String, HashSet<String>)>, String> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse datasets JSON: {}", e))?;
    let map = value
        .as_object()
        .ok_or("Datasets file must be a JSON object mapping labels to element arrays")?;
    map.iter()
        .map(|(label, elements)| {
            let array = elements
                .as_array()
                .ok_or_else(|| format!("Dataset '{}' must be an array of elements", label))?;
            let set = array
                .iter()
                .map(|element| match element {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Ok((label.clone(), set))
        })
        .collect()
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let svg_width = (tree.size().width() * scale).ceil() as u32;
    let svg_height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(svg_width, svg_height).ok_or("Failed to create pixmap")?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(fontdb);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Keep text as paths for broader viewer/font compatibility.
    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;
    let page_options = svg2pdf::PageOptions::default();

    svg2pdf::to_pdf(&tree, options, page_options)
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

#[cfg(test)]
mod tests {
    use super::parse_datasets;

    #[test]
    fn datasets_keep_input_order() {
        let data = parse_datasets(r#"{"zebra": [1], "apple": [2], "mango": [3]}"#).unwrap();
        let labels: Vec<&str> = data.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn elements_are_canonicalized_by_value() {
        let data = parse_datasets(r#"{"a": ["x", "x", 1, 1.5], "b": []}"#).unwrap();
        assert_eq!(data[0].1.len(), 3);
        assert!(data[0].1.contains("x"));
        assert!(data[0].1.contains("1"));
        assert!(data[0].1.contains("1.5"));
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert!(parse_datasets("[1, 2, 3]").is_err());
        assert!(parse_datasets(r#"{"a": 3}"#).is_err());
    }
}
