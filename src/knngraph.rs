//! Symmetric k-nearest-neighbor graph construction.
//!
//! ## Algorithm
//!
//! 1. **Distance matrix**: full N×N pairwise distances under the supplied
//!    [`Distance`] strategy. Only the upper triangle is computed (rows in
//!    parallel with rayon) and mirrored, so `D = Dᵗ` holds bit-for-bit even
//!    for a sloppy caller-supplied premetric.
//! 2. **Diagonal sentinel**: each `D[i][i]` is set to `f64::INFINITY` so an
//!    observation can never be its own neighbor.
//! 3. **Selection**: per row, the k smallest distances are marked; ties are
//!    broken by ascending original index, so the selection is deterministic.
//! 4. **Symmetrization**: `A = NN ∨ NNᵗ`; i and j are connected if either
//!    considers the other a near neighbor.
//! 5. **Post-condition**: A must be exactly symmetric; a violation aborts
//!    with an internal error rather than returning a corrupted graph.
//! 6. **Weighting** (optional): nonzero indicators are replaced by
//!    `weighting(D[i][j])`; the zero pattern is untouched.
//!
//! ## Complexity
//!
//! O(N²) distances plus O(N² log N) selection; this bounds practical N to a
//! few thousand observations.

use rayon::prelude::*;
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info, trace};

use crate::distance::{Distance, Weighting};
use crate::error::{Error, Result};
use crate::graph::{Adjacency, GraphParams};

/// Full pairwise distance matrix with an infinite diagonal.
///
/// Rows of the upper triangle are computed in parallel; results are
/// identical to sequential evaluation since each entry is independent.
pub fn pairwise_distances(rows: &[Vec<f64>], distance: &dyn Distance) -> Vec<Vec<f64>> {
    let n = rows.len();
    trace!("computing {n}x{n} pairwise distance matrix");

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| ((i + 1)..n).map(|j| distance.distance(&rows[i], &rows[j])).collect())
        .collect();

    let mut dist = vec![vec![0.0; n]; n];
    for (i, row) in upper.iter().enumerate() {
        dist[i][i] = f64::INFINITY;
        for (offset, &d) in row.iter().enumerate() {
            let j = i + 1 + offset;
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }
    debug!("distance matrix complete for {n} observations");
    dist
}

/// Raw 0/1 nearest-neighbor indicator, before symmetrization.
///
/// Row i marks exactly k positions whenever `n - 1 >= k`. Ties on equal
/// distance are broken by ascending index.
pub(crate) fn nearest_neighbor_indicator(dist: &[Vec<f64>], k: usize) -> Vec<Vec<bool>> {
    let n = dist.len();
    let mut marked = vec![vec![false; n]; n];
    for i in 0..n {
        let mut order: Vec<usize> = (0..n).filter(|&j| j != i).collect();
        order.sort_unstable_by(|&a, &b| {
            dist[i][a]
                .partial_cmp(&dist[i][b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        for &j in order.iter().take(k) {
            marked[i][j] = true;
        }
    }
    marked
}

/// Build the symmetric kNN adjacency matrix for a feature matrix.
///
/// `weighting = None` leaves the binary indicator; otherwise nonzero
/// entries become `weighting(D[i][j])`.
pub fn build_adjacency(
    rows: &[Vec<f64>],
    k: usize,
    distance: &dyn Distance,
    weighting: Option<&dyn Weighting>,
    bandwidth: Option<f64>,
) -> Result<Adjacency> {
    let n = rows.len();
    if n < 2 {
        return Err(Error::invalid(format!("need at least 2 observations, got {n}")));
    }
    if k < 1 || k > n - 1 {
        return Err(Error::invalid(format!(
            "neighbor count k={k} outside valid range [1, {}]",
            n - 1
        )));
    }

    info!(
        "building kNN graph: {} observations, k={}, weighted={}",
        n,
        k,
        weighting.is_some()
    );

    let dist = pairwise_distances(rows, distance);
    let marked = nearest_neighbor_indicator(&dist, k);

    // A = NN ∨ NNᵗ, weights drawn from the mirrored distance matrix.
    let mut data = vec![vec![0.0f64; n]; n];
    let mut edges = 0usize;
    for i in 0..n {
        for j in 0..n {
            if i != j && (marked[i][j] || marked[j][i]) {
                data[i][j] = match weighting {
                    Some(kernel) => kernel.weight(dist[i][j]),
                    None => 1.0,
                };
                if i < j {
                    edges += 1;
                }
            }
        }
    }
    debug!("kNN graph has {edges} undirected edges after symmetrization");

    let matrix = DenseMatrix::from_2d_vec(&data)
        .map_err(|e| Error::internal(format!("adjacency matrix allocation failed: {e}")))?;

    let params = GraphParams { k: Some(k), weighted: weighting.is_some(), bandwidth };
    Adjacency::from_builder(matrix, params)
}
