//! Distance and edge-weighting strategies for graph construction.
//!
//! Both seams are traits rather than bare function values so a caller-built
//! strategy gets a compile-time checked contract:
//!
//! - [`Distance`]: maps a pair of feature vectors to a non-negative scalar.
//!   Must be symmetric (`d(a, b) == d(b, a)`); the triangle inequality is
//!   not required, so non-metric premetrics are accepted.
//! - [`Weighting`]: maps a scalar distance to an edge weight.
//!
//! Provided implementations: [`Euclidean`] (default), [`Manhattan`], and the
//! Gaussian radial basis kernel [`RbfKernel`].

use serde::{Deserialize, Serialize};

/// Pairwise distance between two feature vectors.
///
/// Implementations must be symmetric and non-negative; they are evaluated
/// once per unordered pair, so asymmetry cannot be observed downstream.
///
/// # Panics
///
/// Implementations may panic on mismatched slice lengths; the pipeline only
/// passes rows of one feature matrix.
pub trait Distance: Send + Sync {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

/// Monotone transform from distance to edge weight.
pub trait Weighting: Send + Sync {
    fn weight(&self, r: f64) -> f64;
}

/// Standard L2 distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Euclidean;

impl Distance for Euclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "feature vectors must have equal length");
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}

/// L1 distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Manhattan;

impl Distance for Manhattan {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "feature vectors must have equal length");
        a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum()
    }
}

/// Gaussian radial basis kernel: `w(r) = exp(-(r / bandwidth)^2)`.
///
/// The default bandwidth is 2, the pipeline's default weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RbfKernel {
    pub bandwidth: f64,
}

impl RbfKernel {
    pub fn new(bandwidth: f64) -> Self {
        assert!(bandwidth > 0.0, "bandwidth must be positive, got {bandwidth}");
        Self { bandwidth }
    }
}

impl Default for RbfKernel {
    fn default() -> Self {
        Self { bandwidth: 2.0 }
    }
}

impl Weighting for RbfKernel {
    fn weight(&self, r: f64) -> f64 {
        let t = r / self.bandwidth;
        (-(t * t)).exp()
    }
}
