//! Graph Laplacian and its labelled/unlabelled block partition.
//!
//! `Δ = diag(degree) - A` is derived from the adjacency matrix per call and
//! never mutated. With labelled observations at indices `0..l` and
//! unlabelled at `l..n` (the ordering invariant established by the input
//! preparer), the harmonic system reads
//!
//! ```text
//! Δ_uu · f_u = -Δ_ul · Y
//! ```
//!
//! where `Δ_uu` is the unlabelled×unlabelled block, `Δ_ul` the
//! unlabelled×labelled block, and Y the L×2 label indicator. Since `Δ_ul`
//! has no diagonal entries, `-Δ_ul = A_ul` and the right-hand side is just
//! the adjacency-weighted label mass reaching each unlabelled node.

use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::graph::Adjacency;

/// The partitioned harmonic linear system for one predict call.
#[derive(Debug, Clone)]
pub struct HarmonicSystem {
    /// Unlabelled×unlabelled Laplacian block.
    pub delta_uu: DenseMatrix<f64>,
    /// Right-hand side `-Δ_ul · Y`, one column per class.
    pub rhs: DenseMatrix<f64>,
    pub n_labelled: usize,
    pub n_unlabelled: usize,
}

/// Partition the Laplacian of `adjacency` at row/column `l = y.shape().0`.
///
/// Fails with `InvalidInput` when the label matrix does not leave at least
/// one unlabelled observation.
pub fn partition_system(adjacency: &Adjacency, y: &DenseMatrix<f64>) -> Result<HarmonicSystem> {
    let n = adjacency.nnodes();
    let (l, classes) = y.shape();
    if classes != 2 {
        return Err(Error::invalid(format!(
            "label matrix must have exactly 2 columns, got {classes}"
        )));
    }
    if l == 0 || l >= n {
        return Err(Error::invalid(format!(
            "need 1..{} labelled observations out of {n}, got {l}",
            n - 1
        )));
    }
    let u = n - l;
    info!("partitioning Laplacian: {n} nodes, {l} labelled, {u} unlabelled");

    let degrees = adjacency.degrees();

    // Δ_uu = diag(degree)_uu - A_uu
    let mut delta_uu: DenseMatrix<f64> = DenseMatrix::zeros(u, u);
    for i in 0..u {
        for j in 0..u {
            let a = adjacency.get(l + i, l + j);
            let value = if i == j { degrees[l + i] } else { -a };
            delta_uu.set((i, j), value);
        }
    }

    // rhs = -Δ_ul · Y = A_ul · Y
    let mut rhs: DenseMatrix<f64> = DenseMatrix::zeros(u, 2);
    for i in 0..u {
        for c in 0..2 {
            let mass: f64 =
                (0..l).map(|j| adjacency.get(l + i, j) * *y.get((j, c))).sum();
            rhs.set((i, c), mass);
        }
    }

    debug!("harmonic system assembled: Δ_uu is {u}x{u}, rhs is {u}x2");
    Ok(HarmonicSystem { delta_uu, rhs, n_labelled: l, n_unlabelled: u })
}
