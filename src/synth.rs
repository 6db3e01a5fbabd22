//! Synthetic crescent-moon dataset generator.
//!
//! Produces the classic interleaving two-moons configuration as a
//! ready-to-label [`Table`]: two half-circle arcs with Gaussian jitter, a
//! configurable number of rows stripped of their class label. All
//! randomness is seeded, so a given configuration always yields the same
//! table.

use std::f64::consts::PI;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::table::{Table, Value};

/// Configuration for [`crescent_moons`].
#[derive(Debug, Clone)]
pub struct MoonParams {
    /// Total observations, split evenly between the two arcs.
    pub n: usize,
    /// How many rows lose their label (must stay below `n`).
    pub unlabelled: usize,
    /// Standard deviation of the Gaussian jitter on both coordinates.
    pub noise: f64,
    pub seed: u64,
}

impl Default for MoonParams {
    fn default() -> Self {
        Self { n: 100, unlabelled: 20, noise: 0.1, seed: 128 }
    }
}

/// Generate a two-moons table with columns `x`, `y`, `class`.
///
/// The class column holds `"upper"` / `"lower"`; unlabelled rows get a
/// missing class cell. Rows are emitted in shuffled order so labelled and
/// unlabelled observations interleave, exercising the preparer's reorder.
pub fn crescent_moons(params: &MoonParams) -> Result<Table> {
    if params.n < 4 {
        return Err(Error::invalid(format!(
            "two-moons generation needs at least 4 observations, got {}",
            params.n
        )));
    }
    if params.unlabelled >= params.n {
        return Err(Error::invalid(format!(
            "unlabelled count {} must be below the total observation count {}",
            params.unlabelled, params.n
        )));
    }
    let noise = Normal::new(0.0, params.noise)
        .map_err(|e| Error::invalid(format!("invalid noise parameter: {e}")))?;

    info!(
        "generating two-moons dataset: n={}, unlabelled={}, noise={}, seed={}",
        params.n, params.unlabelled, params.noise, params.seed
    );
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let upper = params.n / 2;
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(params.n);
    for i in 0..params.n {
        let t: f64 = rng.random_range(0.0..PI);
        let (x, y, class) = if i < upper {
            (t.cos(), t.sin(), "upper")
        } else {
            (1.0 - t.cos(), 0.5 - t.sin(), "lower")
        };
        rows.push(vec![
            Value::Number(x + noise.sample(&mut rng)),
            Value::Number(y + noise.sample(&mut rng)),
            Value::Text(class.to_string()),
        ]);
    }

    // Strip labels from a random subset, then shuffle the row order.
    let mut indices: Vec<usize> = (0..params.n).collect();
    indices.shuffle(&mut rng);
    for &i in indices.iter().take(params.unlabelled) {
        rows[i][2] = Value::Missing;
    }
    rows.shuffle(&mut rng);

    debug!("two-moons table complete: {} rows", rows.len());
    Table::new(["x", "y", "class"], rows)
}
