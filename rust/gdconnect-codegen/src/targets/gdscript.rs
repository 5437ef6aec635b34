//! GDScript target: one client unit per schema file, one shared runtime
//! unit per run.

mod client;
mod runtime;
pub mod types;

pub use client::generate_client;
pub use runtime::generate_runtime;

/// Output path of the shared runtime unit, at the output root. Every
/// client unit `extends` it by relative path.
pub const RUNTIME_UNIT_PATH: &str = "connect_client.gd";
