//! Public entry points: configuration builder and the two predict surfaces.
//!
//! [`HarmonicLabeler`] carries the pipeline configuration and exposes two
//! semantically equivalent call signatures that differ only in how the
//! graph is supplied:
//!
//! - [`HarmonicLabeler::predict_table`]: a row-oriented table plus column
//!   selectors; the kNN graph is built from the feature columns.
//! - [`HarmonicLabeler::predict_graph`]: a precomputed adjacency matrix
//!   (already labelled-first ordered and symmetric) plus a target vector.
//!
//! Both return one prediction record per unlabelled observation. The
//! pipeline is synchronous and stateless across calls.

use std::fmt::Debug;

use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info};

use crate::assign::{assign_classes, column_sums, Prediction};
use crate::distance::{Distance, Euclidean, RbfKernel, Weighting};
use crate::error::{Error, Result};
use crate::graph::{Adjacency, GraphParams};
use crate::knngraph::build_adjacency;
use crate::laplacian::partition_system;
use crate::prepare::{prepare_table, prepare_targets};
use crate::solver::{solve_harmonic, SolveMode};
use crate::table::{Table, TableSpec, Value};

/// Configuration for one labelling pipeline.
///
/// Defaults: `k = 5`, CMN enabled, approximate (CG) solver, Euclidean
/// distance, Gaussian kernel weighting with bandwidth 2.
pub struct HarmonicLabeler {
    k: usize,
    cmn: bool,
    exact: bool,
    distance: Box<dyn Distance>,
    weighting: Option<Box<dyn Weighting>>,
    // Recorded when the weighting is the stock Gaussian kernel, so the
    // graph params stay comparable across runs.
    bandwidth: Option<f64>,
    cg_tolerance: f64,
    cg_max_iterations: usize,
}

impl Default for HarmonicLabeler {
    fn default() -> Self {
        debug!("creating HarmonicLabeler with default parameters");
        Self {
            k: 5,
            cmn: true,
            exact: false,
            distance: Box::new(Euclidean),
            weighting: Some(Box::new(RbfKernel::default())),
            bandwidth: Some(RbfKernel::default().bandwidth),
            cg_tolerance: 1e-10,
            cg_max_iterations: 1000,
        }
    }
}

impl HarmonicLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Neighbor count for graph construction (validated against N later).
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Enable or disable class-mass normalization.
    pub fn with_cmn(mut self, cmn: bool) -> Self {
        self.cmn = cmn;
        self
    }

    /// Select the exact (LU) solver instead of preconditioned CG.
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Replace the distance function. Any symmetric non-negative premetric
    /// is accepted.
    pub fn with_distance(mut self, distance: impl Distance + 'static) -> Self {
        self.distance = Box::new(distance);
        self
    }

    /// Replace the edge weighting.
    pub fn with_weighting(mut self, weighting: impl Weighting + 'static) -> Self {
        self.weighting = Some(Box::new(weighting));
        self.bandwidth = None;
        self
    }

    /// Keep the Gaussian kernel but change its bandwidth.
    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.weighting = Some(Box::new(RbfKernel::new(bandwidth)));
        self.bandwidth = Some(bandwidth);
        self
    }

    /// Leave the adjacency matrix as the binary kNN indicator.
    pub fn unweighted(mut self) -> Self {
        self.weighting = None;
        self.bandwidth = None;
        self
    }

    /// Convergence tolerance and iteration cap for the approximate solver.
    pub fn with_cg_parameters(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.cg_tolerance = tolerance;
        self.cg_max_iterations = max_iterations;
        self
    }

    fn mode(&self) -> SolveMode {
        if self.exact {
            SolveMode::Exact
        } else {
            SolveMode::ConjugateGradient {
                tolerance: self.cg_tolerance,
                max_iterations: self.cg_max_iterations,
            }
        }
    }

    /// Tabular interface: build the graph from feature columns and label
    /// the rows whose target cell is missing.
    pub fn predict_table(&self, table: &Table, spec: &TableSpec) -> Result<Vec<Prediction<Value>>> {
        info!(
            "predict_table: {} rows, target='{}', {} feature columns",
            table.nrows(),
            spec.target,
            spec.features.len()
        );
        let prepared = prepare_table(table, spec)?;
        let adjacency = build_adjacency(
            &prepared.x,
            self.k,
            self.distance.as_ref(),
            self.weighting.as_deref(),
            self.bandwidth,
        )?;
        let system = partition_system(&adjacency, &prepared.y)?;
        let y_hat = solve_harmonic(&system, &self.mode())?;
        let prior = self.cmn.then(|| column_sums(&prepared.y));
        Ok(assign_classes(&y_hat, &prepared.classes, &prepared.ids, prior))
    }

    /// Graph interface: the caller supplies an adjacency matrix already in
    /// labelled-first order. Symmetry is re-checked; the ordering invariant
    /// is the caller's responsibility beyond a cheap labelled-first check
    /// on the target vector.
    pub fn predict_graph<L>(
        &self,
        adjacency: DenseMatrix<f64>,
        targets: &[Option<L>],
        ids: Option<&[String]>,
    ) -> Result<Vec<Prediction<L>>>
    where
        L: Clone + PartialEq + Debug,
    {
        let n = targets.len();
        info!("predict_graph: {} observations", n);
        if adjacency.shape() != (n, n) {
            return Err(Error::invalid(format!(
                "adjacency shape {:?} does not match {} target entries",
                adjacency.shape(),
                n
            )));
        }
        let weighted = adjacency.iterator(0).any(|&w| w != 0.0 && w != 1.0);
        // The labeler's k played no part in a matrix it did not build.
        let params = GraphParams { k: None, weighted, bandwidth: None };
        let adjacency = Adjacency::from_matrix(adjacency, params)?;

        let (y, classes, ids, _l) = prepare_targets(targets, ids)?;
        let system = partition_system(&adjacency, &y)?;
        let y_hat = solve_harmonic(&system, &self.mode())?;
        let prior = self.cmn.then(|| column_sums(&y));
        Ok(assign_classes(&y_hat, &classes, &ids, prior))
    }
}
