//! Harmonic-function solver for the partitioned Laplacian system.
//!
//! Two interchangeable modes produce the same `(N-L)×2` output shape:
//!
//! - **Exact**: dense LU factorization of `Δ_uu`, both class columns solved
//!   jointly. A singular block (an unlabelled observation with no path to
//!   any labelled observation) is a structural property of the graph; it is
//!   detected by a reachability pass before the factorization and surfaced
//!   as [`Error::SingularSystem`], never retried here.
//! - **Approximate**: Jacobi-preconditioned Conjugate Gradient on the
//!   class-1 column only, with `Δ_uu` held in CSR form for the matvec. The
//!   class-2 column is derived as the complement, exploiting two-class
//!   complementarity instead of solving twice. CG iterates may drift
//!   slightly outside [0, 1]; they are clamped into
//!   `(f64::EPSILON, 1 - f64::EPSILON)` before complementing, so each row
//!   sums to exactly 1 and both entries are strictly inside (0, 1).
//!
//! Mode selection is a caller decision; the solver never switches modes on
//! failure.

use std::collections::VecDeque;

use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linalg::traits::lu::LUDecomposable;
use sprs::{CsMat, TriMat};

use log::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::laplacian::HarmonicSystem;

/// How to solve the harmonic system.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveMode {
    /// Direct dense LU solve of both class columns.
    Exact,
    /// Jacobi-preconditioned CG on the class-1 column, complemented.
    ConjugateGradient { tolerance: f64, max_iterations: usize },
}

impl Default for SolveMode {
    fn default() -> Self {
        SolveMode::ConjugateGradient { tolerance: 1e-10, max_iterations: 1000 }
    }
}

/// Solve `Δ_uu · f_u = rhs`, returning the `(N-L)×2` probability estimates.
pub fn solve_harmonic(system: &HarmonicSystem, mode: &SolveMode) -> Result<DenseMatrix<f64>> {
    let u = system.n_unlabelled;
    info!("solving harmonic system for {u} unlabelled observations ({mode:?})");

    check_labelled_reachability(system)?;

    match mode {
        SolveMode::Exact => solve_exact(system),
        SolveMode::ConjugateGradient { tolerance, max_iterations } => {
            solve_conjugate_gradient(system, *tolerance, *max_iterations)
        }
    }
}

/// Structural singularity check, run before either numeric backend.
///
/// `Δ_uu` is nonsingular exactly when every unlabelled observation reaches
/// the labelled block, either directly (nonzero right-hand-side mass, since
/// weights are non-negative) or through a chain of other unlabelled
/// observations (nonzero off-diagonal entries). The LU backend aborts on a
/// singular matrix and CG only reports a late curvature breakdown, so the
/// component check runs up front and names the unreachable observation.
fn check_labelled_reachability(system: &HarmonicSystem) -> Result<()> {
    let u = system.n_unlabelled;
    let mut reached = vec![false; u];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for i in 0..u {
        if *system.rhs.get((i, 0)) + *system.rhs.get((i, 1)) > 0.0 {
            reached[i] = true;
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        for j in 0..u {
            if j != i && !reached[j] && *system.delta_uu.get((i, j)) != 0.0 {
                reached[j] = true;
                queue.push_back(j);
            }
        }
    }
    if let Some(i) = reached.iter().position(|&r| !r) {
        let detail = if *system.delta_uu.get((i, i)) == 0.0 {
            format!("unlabelled observation {} has no graph connections", i + 1)
        } else {
            format!("unlabelled observation {} has no path to the labelled block", i + 1)
        };
        return Err(Error::SingularSystem { detail });
    }
    Ok(())
}

fn solve_exact(system: &HarmonicSystem) -> Result<DenseMatrix<f64>> {
    trace!("dense LU solve with {} right-hand sides", system.rhs.shape().1);
    let solution = system
        .delta_uu
        .clone()
        .lu_solve_mut(system.rhs.clone())
        .map_err(|e| Error::SingularSystem {
            detail: format!("LU factorization of the unlabelled block failed ({e})"),
        })?;

    let u = system.n_unlabelled;
    let mut max_drift: f64 = 0.0;
    for i in 0..u {
        let row_sum = *solution.get((i, 0)) + *solution.get((i, 1));
        max_drift = max_drift.max((row_sum - 1.0).abs());
    }
    debug!("exact solve complete, max row-sum drift {max_drift:.3e}");
    Ok(solution)
}

fn solve_conjugate_gradient(
    system: &HarmonicSystem,
    tolerance: f64,
    max_iterations: usize,
) -> Result<DenseMatrix<f64>> {
    let u = system.n_unlabelled;
    let csr = unlabelled_block_csr(&system.delta_uu, u);
    let b: Vec<f64> = (0..u).map(|i| *system.rhs.get((i, 0))).collect();

    // Jacobi preconditioner: the diagonal of Δ_uu (node degrees, strictly
    // positive after the isolated-node check above).
    let inv_diag: Vec<f64> = (0..u).map(|i| 1.0 / *system.delta_uu.get((i, i))).collect();

    let x = preconditioned_cg(&csr, &b, &inv_diag, tolerance, max_iterations)?;

    let mut solution: DenseMatrix<f64> = DenseMatrix::zeros(u, 2);
    let mut clamped = 0usize;
    for (i, &value) in x.iter().enumerate() {
        let p = clamp_unit(value);
        if p != value {
            clamped += 1;
        }
        solution.set((i, 0), p);
        solution.set((i, 1), 1.0 - p);
    }
    if clamped > 0 {
        debug!("clamped {clamped} CG estimates back into the open unit interval");
    }
    Ok(solution)
}

/// Clamp a probability-like score into `(f64::EPSILON, 1 - f64::EPSILON)`.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    x.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
}

/// CSR view of the dense unlabelled block, for the CG matvec.
fn unlabelled_block_csr(delta_uu: &DenseMatrix<f64>, u: usize) -> CsMat<f64> {
    let mut triplets = TriMat::new((u, u));
    for i in 0..u {
        for j in 0..u {
            let value = *delta_uu.get((i, j));
            if value != 0.0 {
                triplets.add_triplet(i, j, value);
            }
        }
    }
    let csr = triplets.to_csr();
    trace!("Δ_uu CSR: {} non-zeros of {}", csr.nnz(), u * u);
    csr
}

fn matvec(m: &CsMat<f64>, x: &[f64], out: &mut [f64]) {
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = m
            .outer_view(i)
            .map(|row| row.iter().map(|(j, &v)| v * x[j]).sum())
            .unwrap_or(0.0);
    }
}

/// Left Jacobi-preconditioned CG with a relative residual stop.
///
/// Exhausting the iteration cap is not an error: the current iterate is
/// returned and clamped by the caller. Breakdown (non-positive curvature)
/// means the block is structurally singular and is reported as such.
fn preconditioned_cg(
    a: &CsMat<f64>,
    b: &[f64],
    inv_diag: &[f64],
    tolerance: f64,
    max_iterations: usize,
) -> Result<Vec<f64>> {
    let n = b.len();
    let b_norm = b.iter().map(|&v| v * v).sum::<f64>().sqrt();
    if b_norm == 0.0 {
        // No label mass reaches any unlabelled node in this column.
        return Ok(vec![0.0; n]);
    }
    let stop = tolerance * b_norm;

    let mut x = vec![0.0f64; n];
    let mut r = b.to_vec();
    let mut z: Vec<f64> = r.iter().zip(inv_diag).map(|(&ri, &mi)| ri * mi).collect();
    let mut p = z.clone();
    let mut ap = vec![0.0f64; n];
    let mut rz_old: f64 = r.iter().zip(&z).map(|(&ri, &zi)| ri * zi).sum();

    for iteration in 0..max_iterations {
        matvec(a, &p, &mut ap);
        let curvature: f64 = p.iter().zip(&ap).map(|(&pi, &api)| pi * api).sum();
        if curvature <= 0.0 || !curvature.is_finite() {
            return Err(Error::SingularSystem {
                detail: format!(
                    "conjugate gradient broke down at iteration {iteration} \
                     (curvature {curvature:.3e})"
                ),
            });
        }
        let alpha = rz_old / curvature;
        for ((xi, pi), (ri, api)) in
            x.iter_mut().zip(&p).zip(r.iter_mut().zip(&ap))
        {
            *xi += alpha * pi;
            *ri -= alpha * api;
        }
        let r_norm = r.iter().map(|&v| v * v).sum::<f64>().sqrt();
        if r_norm <= stop {
            debug!("CG converged in {} iterations, residual {r_norm:.3e}", iteration + 1);
            return Ok(x);
        }
        for ((zi, ri), mi) in z.iter_mut().zip(&r).zip(inv_diag) {
            *zi = ri * mi;
        }
        let rz_new: f64 = r.iter().zip(&z).map(|(&ri, &zi)| ri * zi).sum();
        let beta = rz_new / rz_old;
        for (pi, zi) in p.iter_mut().zip(&z) {
            *pi = zi + beta * *pi;
        }
        rz_old = rz_new;
    }

    warn!("CG hit the iteration cap ({max_iterations}) before reaching tolerance");
    Ok(x)
}
