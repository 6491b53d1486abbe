use clap::{Parser, ValueEnum};
use color_eyre::Result;
use std::path::PathBuf;

use ifc_tree::export::{export_csv, export_json, JsonSink, Sink};
use ifc_tree::model::NoGeometry;
use ifc_tree::{load_ifc_file, Projector, ProjectorOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ifc-tree")]
#[command(about = "IFC Tree - convert an IFC model into a property-enriched object tree")]
#[command(version)]
struct Args {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Export the tree to JSON (prints to stdout when no export is given)
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Export one row per tree node to CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Leave property sets out of the tree
    #[arg(long)]
    no_properties: bool,

    /// Log level for tracing output (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

fn init_logging(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.log_level);

    let graph = load_ifc_file(args.file.as_path())?;
    let tree = Projector::new(&graph, &NoGeometry)
        .with_options(ProjectorOptions {
            include_properties: !args.no_properties,
            include_geometry: false,
        })
        .project()?;

    if let Some(json_path) = &args.json {
        export_json(&tree, json_path)?;
        eprintln!("Exported to JSON: {}", json_path.display());
    }

    if let Some(csv_path) = &args.csv {
        export_csv(&tree, csv_path)?;
        eprintln!("Exported to CSV: {}", csv_path.display());
    }

    if args.json.is_none() && args.csv.is_none() {
        JsonSink::new(std::io::stdout().lock()).accept(&tree)?;
    }

    Ok(())
}
