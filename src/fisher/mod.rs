//! Fisher-matrix elements of the leading-order precessing inspiral
//!
//! The semi-analytic approximation sums ten $(m, s)$ harmonic terms, each an SNR-weighted
//! product of phase derivatives. Numerical elements built from the strain itself and effective
//! elements fitted to overlap sweeps are provided for cross-checks.

mod element;
pub use element::{
    ElementTerms, HARMONIC_M, HELICITY_S, SubBlocks, TermFactor,
    approximate_fisher_element, approximate_fisher_element_breakdown,
    approximate_fisher_element_intermediate, fisher_term_breakdown, fisher_term_factor,
};

mod effective;
pub use effective::{
    effective_fisher, effective_fisher_element, effective_fisher_from_table, quadratic_residual,
};

mod matrix;
pub use matrix::approximate_fisher_matrix;

mod numerical;
pub use numerical::numerical_fisher_element;
