#![deny(unsafe_code)]

//! GDScript Connect-RPC client generation.
//!
//! Given a resolved schema graph ([`gdconnect_schema::Schema`]), this
//! crate produces:
//!
//! - one client unit per schema file that declares at least one service,
//!   named after the schema file (`helloworld/v1/hello.proto` →
//!   `helloworld/v1/hello.gd`);
//! - exactly one shared runtime unit per run, `connect_client.gd`, which
//!   every client unit extends by relative path. Re-emission is
//!   idempotent: identical content each run, safe to overwrite.
//!
//! Schema loading and file output are the host's concern; generation here
//! is a pure function from graph to [`GeneratedUnit`]s.
//!
//! # Pipeline
//!
//! ```text
//! resolved schema graph → generate() → GeneratedUnits → written by host
//! ```

pub mod code_writer;
pub mod render;
pub mod targets;

use std::fmt;

use gdconnect_schema::Schema;

/// One generated output: a block of source text plus its output path,
/// relative to the host's output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub path: String,
    pub contents: String,
}

/// Errors from a generation run.
///
/// Rendering is all-or-nothing per run: any render failure aborts the
/// whole run and no partial output is considered valid.
#[derive(Debug)]
pub enum EmitError {
    Render(fmt::Error),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::Render(e) => write!(f, "failed to render generated unit: {e}"),
        }
    }
}

impl std::error::Error for EmitError {}

impl From<fmt::Error> for EmitError {
    fn from(e: fmt::Error) -> Self {
        EmitError::Render(e)
    }
}

/// Run a whole generation pass: one client unit per schema file with
/// services, plus the shared runtime unit.
pub fn generate(schema: &Schema) -> Result<Vec<GeneratedUnit>, EmitError> {
    let mut units = Vec::new();

    for file in &schema.files {
        if file.services.is_empty() {
            tracing::debug!(file = %file.name, "no services declared, skipping");
            continue;
        }
        tracing::debug!(
            file = %file.name,
            services = file.services.len(),
            "generating client unit"
        );
        units.push(GeneratedUnit {
            path: render::client_unit_path(&file.name),
            contents: targets::gdscript::generate_client(file)?,
        });
    }

    // The shared runtime goes out once per run, however many schema files
    // were processed.
    units.push(GeneratedUnit {
        path: targets::gdscript::RUNTIME_UNIT_PATH.to_string(),
        contents: targets::gdscript::generate_runtime()?,
    });

    Ok(units)
}
