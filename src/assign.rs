//! Class assignment: hard predictions from probability estimates, with
//! optional class-mass normalization (CMN).
//!
//! CMN rescales each class column by `prior / mass`, where the prior is the
//! empirical class frequency among labelled observations and the mass is
//! the aggregate predicted score of the class over the unlabelled block.
//! This corrects predictions on imbalanced label sets toward the known
//! class proportions.
//!
//! Ties on equal scores resolve to class 1 (the first-encountered label),
//! a deterministic convention applied to both raw and adjusted scores.

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info};

/// One prediction per unlabelled observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction<L> {
    /// Caller-supplied identifier, or the 1-based original row position.
    pub id: String,
    /// Raw class-1/class-2 probability estimates.
    pub scores: [f64; 2],
    /// CMN-adjusted scores, present when CMN was requested.
    pub cmn_scores: Option<[f64; 2]>,
    /// Predicted label, drawn from the caller's label domain.
    pub label: L,
}

/// Column sums of an n×2 matrix (label prior or predicted class mass).
pub fn column_sums(matrix: &DenseMatrix<f64>) -> [f64; 2] {
    let (rows, _) = matrix.shape();
    let mut sums = [0.0f64; 2];
    for i in 0..rows {
        sums[0] += *matrix.get((i, 0));
        sums[1] += *matrix.get((i, 1));
    }
    sums
}

// Argmax over two scores; equal scores prefer class 1.
fn argmax2(scores: [f64; 2]) -> usize {
    if scores[1] > scores[0] {
        1
    } else {
        0
    }
}

/// Turn the solver output into prediction records.
///
/// `prior` is the column sum of the label indicator Y; passing `Some`
/// enables CMN. Raw scores are always included; adjusted scores only when
/// CMN runs.
pub fn assign_classes<L: Clone>(
    y_hat: &DenseMatrix<f64>,
    classes: &[L; 2],
    ids: &[String],
    prior: Option<[f64; 2]>,
) -> Vec<Prediction<L>> {
    let (u, _) = y_hat.shape();
    assert_eq!(ids.len(), u, "one identifier required per unlabelled observation");

    let scale = prior.map(|prior| {
        let mass = column_sums(y_hat);
        debug!(
            "CMN: prior=[{:.1}, {:.1}], mass=[{:.6}, {:.6}]",
            prior[0], prior[1], mass[0], mass[1]
        );
        // A zero class mass carries no votes to rescale; leave that column
        // untouched rather than dividing by zero.
        [
            if mass[0] > 0.0 { prior[0] / mass[0] } else { 1.0 },
            if mass[1] > 0.0 { prior[1] / mass[1] } else { 1.0 },
        ]
    });

    let mut predictions = Vec::with_capacity(u);
    for i in 0..u {
        let raw = [*y_hat.get((i, 0)), *y_hat.get((i, 1))];
        let (cmn_scores, decisive) = match scale {
            Some(scale) => {
                let adjusted = [raw[0] * scale[0], raw[1] * scale[1]];
                (Some(adjusted), adjusted)
            }
            None => (None, raw),
        };
        let class = argmax2(decisive);
        predictions.push(Prediction {
            id: ids[i].clone(),
            scores: raw,
            cmn_scores,
            label: classes[class].clone(),
        });
    }

    info!(
        "assigned {} predictions ({} with CMN adjustment)",
        predictions.len(),
        if scale.is_some() { "all" } else { "none" }
    );
    predictions
}
