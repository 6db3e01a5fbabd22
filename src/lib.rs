//! # harmonia
//!
//! Graph-based semi-supervised classification for two-class problems using
//! the Gaussian Random Field / Harmonic Function method: observations with
//! known labels anchor a weighted k-nearest-neighbor graph, and the labels
//! of the remaining observations are inferred as the harmonic extension
//! over that graph, i.e. each unlabelled node takes the weighted average of
//! its neighbors' values, the smoothest labelling the graph admits.
//!
//! ## Pipeline
//!
//! 1. **Input preparation** ([`prepare`]): labelled/unlabelled partition,
//!    labelled-first reorder with an explicit permutation, L×2 label
//!    indicator matrix.
//! 2. **Graph construction** ([`knngraph`], [`graph`]): pairwise distances
//!    under a pluggable [`distance::Distance`] strategy, symmetric kNN
//!    adjacency, optional kernel weighting.
//! 3. **Harmonic solve** ([`laplacian`], [`solver`]): Laplacian block
//!    partition and either an exact LU solve or Jacobi-preconditioned
//!    Conjugate Gradient.
//! 4. **Class assignment** ([`assign`]): argmax predictions, optionally
//!    adjusted by class-mass normalization against the empirical prior.
//!
//! ## Example
//!
//! ```
//! use harmonia::{HarmonicLabeler, Table, TableSpec, Value};
//!
//! let table = Table::new(
//!     ["x", "y", "class"],
//!     vec![
//!         vec![0.0.into(), 0.0.into(), "a".into()],
//!         vec![0.0.into(), 1.0.into(), "a".into()],
//!         vec![10.0.into(), 10.0.into(), "b".into()],
//!         vec![10.0.into(), 11.0.into(), "b".into()],
//!         vec![0.2.into(), 0.5.into(), Value::Missing],
//!     ],
//! )
//! .unwrap();
//!
//! let predictions = HarmonicLabeler::new()
//!     .with_k(1)
//!     .with_exact(true)
//!     .predict_table(&table, &TableSpec::new("class", ["x", "y"]))
//!     .unwrap();
//!
//! assert_eq!(predictions.len(), 1);
//! assert_eq!(predictions[0].label, Value::Text("a".into()));
//! ```
//!
//! The pipeline is synchronous and holds no state across calls; logging is
//! emitted through the `log` facade (initialize `env_logger` or another
//! backend to see it).

pub mod assign;
pub mod builder;
pub mod distance;
pub mod error;
pub mod graph;
pub mod knngraph;
pub mod laplacian;
pub mod prepare;
pub mod solver;
pub mod synth;
pub mod table;

pub use assign::Prediction;
pub use builder::HarmonicLabeler;
pub use distance::{Distance, Euclidean, Manhattan, RbfKernel, Weighting};
pub use error::{Error, Result};
pub use graph::{Adjacency, GraphParams};
pub use solver::SolveMode;
pub use table::{Table, TableSpec, Value};

#[cfg(test)]
mod tests;
