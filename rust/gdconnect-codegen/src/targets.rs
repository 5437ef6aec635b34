//! Code generation targets. Currently only GDScript.

pub mod gdscript;
