mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::doc::ShapeType;
use canvas::engine::{Action, Engine};
use canvas::error::Notice;
use canvas::export::{ExportOutcome, ExportReport};
use canvas::product::ProductConfig;
use canvas::raster::SkiaRenderer;
use canvas::snapshot::{DesignSnapshot, SnapshotError};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use crate::config::ExportConfig;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{code}: {message}")]
    Rejected { code: &'static str, message: String },
    #[error("export produced no artifacts")]
    ExportFailed,
}

impl From<Notice> for CliError {
    fn from(notice: Notice) -> Self {
        Self::Rejected { code: notice.code, message: notice.message }
    }
}

#[derive(Parser, Debug)]
#[command(name = "studio", about = "Product customization studio: build, price and export designs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a design snapshot from a base product and optional elements.
    New {
        #[arg(long = "type", default_value = "tshirt")]
        product_type: String,
        #[arg(long, default_value = "#FFFFFF")]
        color: String,
        #[arg(long, default_value = "M")]
        size: String,
        #[arg(long, default_value_t = 0.0)]
        unit_price: f64,
        /// Add a text element (repeatable).
        #[arg(long)]
        text: Vec<String>,
        /// Add a shape: circle, rectangle or triangle (repeatable).
        #[arg(long, value_parser = parse_shape)]
        shape: Vec<ShapeType>,
        /// Add an uploaded image from a PNG/JPEG/GIF/WebP file (repeatable).
        #[arg(long)]
        image: Vec<PathBuf>,
        /// Write the snapshot here instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Price a snapshot.
    Price {
        snapshot: PathBuf,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// Override `STUDIO_CUSTOMIZATION_FEE`.
        #[arg(long)]
        fee: Option<f64>,
    },
    /// Export a snapshot to `<name>.png` and `<name>.pdf`.
    Export {
        snapshot: PathBuf,
        /// Output directory.
        #[arg(long, env = "STUDIO_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value = "design")]
        name: String,
        /// Override `STUDIO_EXPORT_SCALE`.
        #[arg(long)]
        scale: Option<f32>,
    },
    /// Check that a snapshot restores into a valid scene.
    Validate { snapshot: PathBuf },
}

fn parse_shape(raw: &str) -> Result<ShapeType, String> {
    match raw.to_ascii_lowercase().as_str() {
        "circle" => Ok(ShapeType::Circle),
        "rectangle" | "rect" => Ok(ShapeType::Rectangle),
        "triangle" => Ok(ShapeType::Triangle),
        other => Err(format!("unknown shape `{other}`")),
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ExportConfig::from_env();

    match cli.command {
        Command::New { product_type, color, size, unit_price, text, shape, image, out } => {
            let product = ProductConfig { product_type, color, size, unit_price };
            run_new(&config, product, &text, &shape, &image, out.as_deref()).await
        }
        Command::Price { snapshot, quantity, fee } => run_price(&config, &snapshot, quantity, fee),
        Command::Export { snapshot, out_dir, name, scale } => {
            let config = ExportConfig { export_scale: scale.unwrap_or(config.export_scale), ..config };
            run_export(&config, &snapshot, &out_dir, &name).await
        }
        Command::Validate { snapshot } => run_validate(&snapshot),
    }
}

fn engine(config: &ExportConfig, product: ProductConfig) -> Engine {
    Engine::new(product, Arc::new(SkiaRenderer::new())).with_limits(config.export_scale, config.max_upload_bytes)
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

fn load_snapshot(path: &Path) -> Result<DesignSnapshot, CliError> {
    let raw = read(path)?;
    Ok(DesignSnapshot::from_json(&String::from_utf8_lossy(&raw))?)
}

/// Turn the first notice among `actions` into an error.
fn check(actions: Vec<Action>) -> Result<(), CliError> {
    match actions.into_iter().find_map(|a| match a {
        Action::Notice(n) => Some(n),
        _ => None,
    }) {
        Some(notice) => Err(notice.into()),
        None => Ok(()),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

async fn run_new(
    config: &ExportConfig,
    product: ProductConfig,
    texts: &[String],
    shapes: &[ShapeType],
    images: &[PathBuf],
    out: Option<&Path>,
) -> Result<(), CliError> {
    let mut engine = engine(config, product);
    for content in texts {
        check(engine.core.add_text())?;
        if let Some(id) = engine.core.selection() {
            check(engine.core.commit_text(&id, content))?;
        }
    }
    for shape in shapes {
        check(engine.core.add_shape(*shape))?;
    }
    for path in images {
        let bytes = read(path)?;
        check(engine.upload_image(bytes).await)?;
    }
    check(engine.core.select_element(None))?;

    let json = engine.core.snapshot().to_json()?;
    match out {
        Some(path) => {
            write(path, json.as_bytes())?;
            eprintln!("wrote {} ({} elements)", path.display(), engine.core.scene.len());
            Ok(())
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn run_price(config: &ExportConfig, snapshot: &Path, quantity: u32, fee: Option<f64>) -> Result<(), CliError> {
    let (scene, product) = load_snapshot(snapshot)?.into_scene()?;
    let signal = canvas::product::pricing(&scene, &product, quantity, fee.unwrap_or(config.customization_fee));
    print_json(&serde_json::to_value(signal)?)
}

async fn run_export(config: &ExportConfig, snapshot: &Path, out_dir: &Path, name: &str) -> Result<(), CliError> {
    let mut engine = engine(config, ProductConfig::default());
    engine.load_snapshot(load_snapshot(snapshot)?)?;
    fs::create_dir_all(out_dir).map_err(|source| CliError::Io { path: out_dir.to_path_buf(), source })?;

    let (report, _) = engine.export().await.map_err(|e| CliError::from(Notice::from_error(&e)))?;
    let summary = write_artifacts(&report, out_dir, name)?;
    print_json(&summary)?;

    if report.outcome() == ExportOutcome::Failed {
        return Err(CliError::ExportFailed);
    }
    Ok(())
}

fn write_artifacts(report: &ExportReport, out_dir: &Path, name: &str) -> Result<Value, CliError> {
    let mut summary = json!({
        "outcome": match report.outcome() {
            ExportOutcome::Complete => "complete",
            ExportOutcome::Partial => "partial",
            ExportOutcome::Failed => "failed",
        },
        "errors": report.notices(),
    });

    if let Some(raster) = &report.raster {
        let path = out_dir.join(format!("{name}.png"));
        write(&path, &raster.bytes)?;
        summary["raster"] = json!({ "path": path.display().to_string(), "width": raster.width, "height": raster.height });
    }
    if let Some(document) = &report.document {
        let path = out_dir.join(format!("{name}.pdf"));
        write(&path, &document.bytes)?;
        summary["document"] = json!({
            "path": path.display().to_string(),
            "pageWidth": document.page_width,
            "pageHeight": document.page_height,
            "orientation": document.orientation,
        });
    }
    for notice in report.notices() {
        tracing::warn!(code = notice.code, message = %notice.message, "artifact failed");
    }
    Ok(summary)
}

fn run_validate(snapshot: &Path) -> Result<(), CliError> {
    let (scene, product) = load_snapshot(snapshot)?.into_scene()?;
    print_json(&json!({
        "valid": true,
        "elements": scene.len(),
        "product": product,
        "view": scene.settings.active_view,
    }))
}
