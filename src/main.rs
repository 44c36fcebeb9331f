use clap::Parser;
use fanchart::fan;
use fanchart::fan::scene::SceneBuilder;
use fanchart::fonts::CosmicTextMeasure;
use fanchart::theme::ChartTheme;
use fanchart::tree::{self, FamilyTree, Person};
use fanchart::viewport::Viewport;
use resvg::usvg;
use std::path::PathBuf;
use tiny_skia::{Pixmap, Transform};

/// A pure Rust genealogy fan chart renderer
#[derive(Parser, Debug)]
#[command(name = "fanchart")]
#[command(version)]
#[command(about = "Render a family tree to a sunburst SVG or PNG", long_about = None)]
struct Args {
    /// Input JSON tree (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg or .png)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to a chart theme TOML file
    #[arg(short, long, value_name = "THEME")]
    theme: Option<PathBuf>,

    /// Display area width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    /// Display area height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let theme = if let Some(ref theme_path) = args.theme {
        if theme_path.exists() && theme_path.is_file() {
            let content = std::fs::read_to_string(theme_path)
                .map_err(|e| format!("Failed to read theme file: {}", e))?;
            ChartTheme::from_toml_str(&content)?
        } else {
            return Err(format!("Theme file not found: {}", theme_path.display()));
        }
    } else {
        ChartTheme::default()
    };

    let source = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };

    // The endpoint serves JSON null for an account with no records yet.
    let root: Option<Person> =
        serde_json::from_str(&source).map_err(|e| format!("Failed to parse tree JSON: {}", e))?;

    let mut measure = CosmicTextMeasure::new()?;
    let prims = match tree::normalize(root.as_ref()) {
        FamilyTree::Empty => SceneBuilder::new(&theme, &mut measure).empty_message(),
        FamilyTree::Root(member) => {
            let laid_out = fan::layout(&member, &theme);
            SceneBuilder::new(&theme, &mut measure).build(&laid_out)
        }
    };

    let mut viewport = Viewport::new(args.width, args.height);
    viewport.on_scale_change(|scale| eprintln!("Zoom: {:.0}%", scale * 100.0));
    viewport.fit_to_content(&fan::bounding_box(&prims));

    let svg = fan::svg::document(&prims, &viewport, &theme);

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
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg or .png)",
                output_ext
            ));
        }
    }

    Ok(())
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
    let transform = Transform::from_scale(scale, scale);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}
