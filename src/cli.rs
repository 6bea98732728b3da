use crate::config::{Config, load_config};
use crate::label_dump::{label_dump_json, write_label_dump};
use crate::parser::{format_labels, parse_labels, parse_routes};
use crate::placement::{FailurePolicy, FallbackStrategy, IndexStrategy, place_labels};
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rlabel", version, about = "Place one label box per route without overlaps")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute label positions for a route file
    Place(PlaceArgs),
    /// Draw routes and labels at one or more zoom levels
    Preview(PreviewArgs),
}

#[derive(clap::Args, Debug)]
pub struct PlaceArgs {
    /// Route file, one `x y x y ...` polyline per line, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    pub format: LabelFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    #[arg(long = "fallback", value_enum)]
    pub fallback: Option<FallbackArg>,

    #[arg(long = "label-width")]
    pub label_width: Option<f64>,

    #[arg(long = "label-height")]
    pub label_height: Option<f64>,

    /// Clearance kept between labels, on both axes
    #[arg(long = "tolerance")]
    pub tolerance: Option<f64>,

    #[arg(long = "on-failure", value_enum)]
    pub on_failure: Option<FailureArg>,
}

#[derive(clap::Args, Debug)]
pub struct PreviewArgs {
    /// Route file
    #[arg(short = 'r', long = "routes")]
    pub routes: PathBuf,

    /// Label file as written by `place`
    #[arg(short = 'l', long = "labels")]
    pub labels: PathBuf,

    /// Output file. With several zoom levels the zoom is appended to the stem.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Zoom level; repeat for several. Defaults to the configured levels.
    #[arg(short = 'z', long = "zoom")]
    pub zoom: Vec<f64>,

    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LabelFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StrategyArg {
    Exact,
    Grid,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FallbackArg {
    VertexWalk,
    NearestFreeCell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FailureArg {
    Skip,
    Abort,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    match args.command {
        Command::Place(place) => run_place(place),
        Command::Preview(preview) => run_preview(preview),
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
fn init_tracing() {}

fn run_place(args: PlaceArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_place_overrides(&mut config, &args)?;

    let input = read_input(args.input.as_deref())?;
    let routes = parse_routes(&input)?;
    let layout = place_labels(&routes, &config.placement)?;

    match (args.format, args.output.as_deref()) {
        (LabelFormat::Text, Some(path)) => std::fs::write(path, format_labels(&layout))?,
        (LabelFormat::Text, None) => print!("{}", format_labels(&layout)),
        (LabelFormat::Json, Some(path)) => write_label_dump(path, &layout, &routes, &config.placement)?,
        (LabelFormat::Json, None) => println!("{}", label_dump_json(&layout, &routes, &config.placement)?),
    }

    let failed = layout.failures().count();
    if failed > 0 {
        eprintln!("{failed} of {} route(s) left unplaced", routes.len());
    }
    Ok(())
}

fn apply_place_overrides(config: &mut Config, args: &PlaceArgs) -> Result<()> {
    let placement = &mut config.placement;
    if let Some(strategy) = args.strategy {
        placement.strategy = match strategy {
            StrategyArg::Exact => IndexStrategy::Exact,
            StrategyArg::Grid => IndexStrategy::Grid,
        };
    }
    if let Some(fallback) = args.fallback {
        placement.fallback = match fallback {
            FallbackArg::VertexWalk => FallbackStrategy::VertexWalk,
            FallbackArg::NearestFreeCell => FallbackStrategy::NearestFreeCell,
        };
    }
    if let Some(policy) = args.on_failure {
        placement.on_failure = match policy {
            FailureArg::Skip => FailurePolicy::Skip,
            FailureArg::Abort => FailurePolicy::Abort,
        };
    }
    if let Some(width) = args.label_width {
        placement.label_width = width;
    }
    if let Some(height) = args.label_height {
        placement.label_height = height;
    }
    if let Some(tolerance) = args.tolerance {
        placement.tolerance_x = tolerance;
        placement.tolerance_y = tolerance;
    }
    placement.validate()?;
    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    let zooms = if args.zoom.is_empty() {
        config.render.zoom_levels.clone()
    } else {
        args.zoom.clone()
    };
    if zooms.is_empty() {
        return Err(anyhow::anyhow!("No zoom levels given"));
    }
    if let Some(bad) = zooms.iter().find(|zoom| !zoom.is_finite() || **zoom <= 0.0) {
        return Err(anyhow::anyhow!("Zoom level must be positive, got {bad}"));
    }

    let routes = parse_routes(&std::fs::read_to_string(&args.routes)?)?;
    let labels = parse_labels(&std::fs::read_to_string(&args.labels)?)?;
    if labels.len() != routes.len() {
        return Err(anyhow::anyhow!(
            "{} label line(s) for {} route(s)",
            labels.len(),
            routes.len()
        ));
    }

    if zooms.len() == 1 {
        let svg = render_svg(&routes, &labels, &config, zooms[0])?;
        return match args.output_format {
            OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
            OutputFormat::Png => {
                let output = ensure_output(&args.output, "png")?;
                write_output_png(&svg, &output, &config.render)
            }
        };
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, &zooms)?;
    for (zoom, output) in zooms.iter().zip(&outputs) {
        let svg = render_svg(&routes, &labels, &config, *zoom)?;
        match args.output_format {
            OutputFormat::Svg => write_output_svg(&svg, Some(output))?,
            OutputFormat::Png => write_output_png(&svg, output, &config.render)?,
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(output: Option<&Path>, format: OutputFormat, zooms: &[f64]) -> Result<Vec<PathBuf>> {
    let ext = match format {
        OutputFormat::Svg => "svg",
        OutputFormat::Png => "png",
    };
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for several zoom levels"))?;
    if base.is_dir() {
        return Ok(zooms
            .iter()
            .map(|zoom| base.join(format!("zoom-{}.{}", zoom, ext)))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("preview");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok(zooms
        .iter()
        .map(|zoom| parent.join(format!("{}-{}.{}", stem, zoom, ext)))
        .collect())
}
