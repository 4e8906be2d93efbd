//! Dense symmetric-matrix helpers: flat upper-triangle codec and Schur-complement projection

mod codec;
pub use codec::{symmetric_from_upper, upper_triangle};

mod project;
pub use project::fisher_project;
