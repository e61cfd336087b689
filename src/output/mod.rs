//! Rendering of analysis results.
//!
//! Three surfaces: delimited text ([`table`]) for downstream tooling,
//! JSON ([`json`]) for machine consumption, and a colored terminal
//! summary ([`terminal`]) for humans.

pub mod json;
pub mod table;
pub mod terminal;

pub use json::{sweep_to_json, to_json, to_json_pretty};
pub use table::{render_report, render_sweep, write_report, write_sweep};
pub use terminal::{format_report, format_sweep};
