//! Command line driver for gdconnect.
//!
//! The schema graph arrives as a JSON document produced by an external
//! loader (already resolved and validated); this binary deserializes it,
//! runs generation, and writes every unit under the output directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use gdconnect_schema::Schema;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gdconnect",
    about = "Generate GDScript Connect-RPC clients from a resolved schema graph"
)]
struct Args {
    /// Path to the schema graph JSON document.
    #[arg(long)]
    schema: PathBuf,

    /// Directory the generated units are written under.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Debug)]
enum CliError {
    ReadSchema(PathBuf, std::io::Error),
    ParseSchema(PathBuf, serde_json::Error),
    Emit(gdconnect_codegen::EmitError),
    WriteUnit(PathBuf, std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ReadSchema(path, e) => {
                write!(f, "failed to read schema {}: {e}", path.display())
            }
            CliError::ParseSchema(path, e) => {
                write!(f, "failed to parse schema {}: {e}", path.display())
            }
            CliError::Emit(e) => write!(f, "{e}"),
            CliError::WriteUnit(path, e) => {
                write!(f, "failed to write {}: {e}", path.display())
            }
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let raw = fs::read_to_string(&args.schema)
        .map_err(|e| CliError::ReadSchema(args.schema.clone(), e))?;
    let schema: Schema = serde_json::from_str(&raw)
        .map_err(|e| CliError::ParseSchema(args.schema.clone(), e))?;

    tracing::info!(
        schema = %args.schema.display(),
        files = schema.files.len(),
        "loaded schema graph"
    );

    let units = gdconnect_codegen::generate(&schema).map_err(CliError::Emit)?;

    for unit in &units {
        let path = args.out_dir.join(&unit.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CliError::WriteUnit(path.clone(), e))?;
        }
        fs::write(&path, &unit.contents).map_err(|e| CliError::WriteUnit(path.clone(), e))?;
        tracing::info!(unit = %relative_display(&path, &args.out_dir), "wrote unit");
    }

    Ok(())
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
