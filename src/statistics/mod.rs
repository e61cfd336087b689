//! Statistical kernels for the correlation engine.
//!
//! This module provides the pure numeric building blocks:
//! - Pearson correlation via the closed-form sums method, with a
//!   two-tailed p-value from the Fisher-z normal approximation
//! - The Fisher z-transform with explicit saturation at `|r| = 1`
//! - Strict local extremum detection for lag estimation

mod extrema;
mod fisher;
mod pearson;

pub use extrema::{local_maxima, local_minima, max_in_window, max_sample};
pub use fisher::{fisher_z, z_flip};
pub use pearson::{pearson, two_tailed_p, valid_pairs};
