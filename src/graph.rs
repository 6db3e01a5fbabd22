//! Adjacency matrix type and graph construction parameters.
//!
//! [`Adjacency`] wraps a dense N×N matrix and carries the invariants every
//! downstream stage relies on: non-negative entries, zero diagonal, and
//! exact (value-for-value) symmetry. Unweighted graphs hold {0, 1} entries;
//! weighted graphs hold kernel-transformed distances on the same zero
//! pattern.

use std::fmt;

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, trace, warn};

use crate::error::{Error, Result};

/// Graph construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphParams {
    /// Neighbors marked per observation before symmetrization. `None` for
    /// caller-supplied matrices, where no kNN construction ran.
    pub k: Option<usize>,
    /// Whether edge indicators were replaced by kernel weights.
    pub weighted: bool,
    /// Bandwidth of the default Gaussian kernel, when it was used.
    /// `None` for unweighted graphs and caller-supplied weightings.
    pub bandwidth: Option<f64>,
}

// Approximate equality for the float field, exact for the rest.
impl PartialEq for GraphParams {
    fn eq(&self, other: &Self) -> bool {
        self.k == other.k
            && self.weighted == other.weighted
            && match (self.bandwidth, other.bandwidth) {
                (None, None) => true,
                (Some(a), Some(b)) => approx::relative_eq!(a, b),
                _ => false,
            }
    }
}

impl Eq for GraphParams {}

/// Symmetric non-negative adjacency matrix with zero diagonal.
#[derive(Debug, Clone)]
pub struct Adjacency {
    matrix: DenseMatrix<f64>,
    nnodes: usize,
    params: GraphParams,
}

impl Adjacency {
    /// Wrap a freshly built matrix, enforcing the structural invariants.
    ///
    /// Exact-symmetry violation is reported as an [`Error::Internal`]: the
    /// builder constructs both triangles from one pass, so asymmetry means a
    /// defect in the construction itself, not bad user input.
    pub(crate) fn from_builder(matrix: DenseMatrix<f64>, params: GraphParams) -> Result<Self> {
        let nnodes = matrix.shape().0;
        let adjacency = Self { matrix, nnodes, params };
        if let Some((i, j)) = adjacency.first_asymmetry() {
            warn!("adjacency construction produced asymmetric entry at ({i}, {j})");
            return Err(Error::internal(format!(
                "adjacency matrix not symmetric at ({i}, {j})"
            )));
        }
        adjacency.check_structure()?;
        Ok(adjacency)
    }

    /// Wrap a caller-supplied matrix (graph interface). The labelled-first
    /// ordering is the caller's responsibility; only the structural checks
    /// run here, and a failure is malformed input rather than a defect.
    pub fn from_matrix(matrix: DenseMatrix<f64>, params: GraphParams) -> Result<Self> {
        let (r, c) = matrix.shape();
        if r != c {
            return Err(Error::invalid(format!(
                "adjacency matrix must be square, got {r}x{c}"
            )));
        }
        let adjacency = Self { matrix, nnodes: r, params };
        if let Some((i, j)) = adjacency.first_asymmetry() {
            return Err(Error::invalid(format!(
                "supplied adjacency matrix is not symmetric at ({i}, {j})"
            )));
        }
        adjacency.check_structure().map_err(|e| match e {
            Error::Internal { reason } => Error::invalid(reason),
            other => other,
        })?;
        Ok(adjacency)
    }

    /// First (i, j) where `A[i][j] != A[j][i]` exactly, if any.
    fn first_asymmetry(&self) -> Option<(usize, usize)> {
        trace!("checking exact symmetry of {}x{} adjacency", self.nnodes, self.nnodes);
        for i in 0..self.nnodes {
            for j in (i + 1)..self.nnodes {
                if *self.matrix.get((i, j)) != *self.matrix.get((j, i)) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Zero diagonal and non-negative entries.
    fn check_structure(&self) -> Result<()> {
        for i in 0..self.nnodes {
            if *self.matrix.get((i, i)) != 0.0 {
                return Err(Error::internal(format!(
                    "adjacency diagonal entry ({i}, {i}) is nonzero"
                )));
            }
            for j in 0..self.nnodes {
                let w = *self.matrix.get((i, j));
                if !(w >= 0.0) {
                    return Err(Error::internal(format!(
                        "adjacency entry ({i}, {j}) = {w} is negative or NaN"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn nnodes(&self) -> usize {
        self.nnodes
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.nnodes && j < self.nnodes,
            "index out of bounds: ({}, {}) for {}x{} matrix",
            i,
            j,
            self.nnodes,
            self.nnodes
        );
        *self.matrix.get((i, j))
    }

    /// Degree vector: row sums of the adjacency matrix.
    pub fn degrees(&self) -> Vec<f64> {
        let mut degrees = Vec::with_capacity(self.nnodes);
        for i in 0..self.nnodes {
            let degree: f64 = (0..self.nnodes).map(|j| *self.matrix.get((i, j))).sum();
            degrees.push(degree);
        }
        let (min_degree, max_degree) = degrees
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &d| {
                (min.min(d), max.max(d))
            });
        debug!("adjacency degrees: min={min_degree:.6}, max={max_degree:.6}");
        degrees
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.matrix.iterator(0).filter(|&&w| w != 0.0).count()
    }

    /// Fraction of zero entries.
    pub fn sparsity(&self) -> f64 {
        let total = self.nnodes * self.nnodes;
        (total - self.nnz()) as f64 / total as f64
    }

    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    pub fn matrix(&self) -> &DenseMatrix<f64> {
        &self.matrix
    }
}

impl fmt::Display for Adjacency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Adjacency ({}x{}):", self.nnodes, self.nnodes)?;
        writeln!(f, "Parameters: {:?}", self.params)?;
        if self.nnodes <= 10 {
            for i in 0..self.nnodes {
                write!(f, "Row {i}: [")?;
                for j in 0..self.nnodes {
                    write!(f, "{:8.4} ", self.matrix.get((i, j)))?;
                }
                writeln!(f, "]")?;
            }
        } else {
            writeln!(
                f,
                "Non-zero entries: {} ({:.2}% dense)",
                self.nnz(),
                (1.0 - self.sparsity()) * 100.0
            )?;
        }
        Ok(())
    }
}
