//! Input preparation: labelled/unlabelled partition, labelled-first
//! reordering, and label-indicator matrix construction.
//!
//! Every downstream stage relies on the ordering invariant established
//! here: labelled observations occupy indices `0..l`, unlabelled ones
//! `l..n`, with relative order preserved inside each group. The reorder is
//! expressed as an explicit permutation (`reordered position -> original
//! row`) so the mapping back to caller identifiers stays unambiguous and
//! testable on its own.

use std::fmt::Debug;

use smartcore::linalg::basic::arrays::{Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::table::{Table, TableSpec, Value};

/// Output of the preparation stage for the tabular interface.
#[derive(Debug, Clone)]
pub struct Prepared<L> {
    /// Feature matrix, reordered labelled-first.
    pub x: Vec<Vec<f64>>,
    /// L×2 binary label indicator over the reordered labelled rows.
    pub y: DenseMatrix<f64>,
    /// The two class values, in first-encountered order. This order fixes
    /// which indicator column is "class 1" for the whole pipeline.
    pub classes: [L; 2],
    /// One identifier per unlabelled observation, in reordered order.
    pub ids: Vec<String>,
    /// `permutation[p] = original row index` of reordered position `p`.
    pub permutation: Vec<usize>,
    pub n_labelled: usize,
}

/// Prepare a table for the pipeline: partition by missing target, reorder
/// labelled-first, build Y, resolve identifiers.
pub fn prepare_table(table: &Table, spec: &TableSpec) -> Result<Prepared<Value>> {
    let n = table.nrows();
    if n < 2 {
        return Err(Error::invalid(format!("need at least 2 observations, got {n}")));
    }

    let target_col = table.column_index(&spec.target)?;
    let feature_cols: Vec<usize> = spec
        .features
        .iter()
        .map(|name| table.column_index(name))
        .collect::<Result<_>>()?;
    if feature_cols.is_empty() {
        return Err(Error::invalid("at least one feature column is required"));
    }
    let id_col = spec.id.as_deref().map(|name| table.column_index(name)).transpose()?;

    // Partition by the unlabelled mask (missing target), preserving relative
    // order within each group.
    let mut labelled: Vec<usize> = Vec::new();
    let mut unlabelled: Vec<usize> = Vec::new();
    for row in 0..n {
        if table.cell(row, target_col).is_missing() {
            unlabelled.push(row);
        } else {
            labelled.push(row);
        }
    }
    let l = labelled.len();
    info!("prepared partition: {l} labelled, {} unlabelled of {n} rows", unlabelled.len());
    if unlabelled.is_empty() {
        return Err(Error::invalid("no unlabelled observations: nothing to predict"));
    }

    // Class discovery in first-encountered order over labelled rows.
    let mut classes: Vec<Value> = Vec::with_capacity(2);
    let mut class_of: Vec<usize> = Vec::with_capacity(l);
    for &row in &labelled {
        let label = table.cell(row, target_col);
        let idx = match classes.iter().position(|c| c == label) {
            Some(idx) => idx,
            None => {
                classes.push(label.clone());
                classes.len() - 1
            }
        };
        class_of.push(idx);
    }
    if classes.len() != 2 {
        return Err(Error::invalid(format!(
            "exactly 2 distinct class labels are required, found {}",
            classes.len()
        )));
    }
    debug!("classes (first-encountered order): {} / {}", classes[0], classes[1]);

    // Feature extraction in reordered (labelled-first) sequence.
    let permutation: Vec<usize> = labelled.iter().chain(unlabelled.iter()).copied().collect();
    let mut x: Vec<Vec<f64>> = Vec::with_capacity(n);
    for &row in &permutation {
        let mut features = Vec::with_capacity(feature_cols.len());
        for &col in &feature_cols {
            let value = table.cell(row, col).as_number().ok_or_else(|| {
                Error::invalid(format!(
                    "feature column '{}' is non-numeric at row {}",
                    table.headers()[col],
                    row + 1
                ))
            })?;
            features.push(value);
        }
        x.push(features);
    }

    let y = indicator_matrix(&class_of);

    // Identifiers for unlabelled rows: the id column when given, else the
    // 1-based original row position.
    let ids: Vec<String> = unlabelled
        .iter()
        .map(|&row| match id_col {
            Some(col) => table.cell(row, col).to_string(),
            None => (row + 1).to_string(),
        })
        .collect();

    let mut classes = classes.into_iter();
    let first = classes.next().unwrap();
    let second = classes.next().unwrap();

    Ok(Prepared {
        x,
        y,
        classes: [first, second],
        ids,
        permutation,
        n_labelled: l,
    })
}

/// Prepare a target vector for the graph interface.
///
/// The adjacency matrix accompanying these targets must already be ordered
/// labelled-first; the only structural validation here is that no unknown
/// target precedes a known one (the block partition would silently
/// mis-slice otherwise).
pub fn prepare_targets<L>(
    targets: &[Option<L>],
    ids: Option<&[String]>,
) -> Result<(DenseMatrix<f64>, [L; 2], Vec<String>, usize)>
where
    L: Clone + PartialEq + Debug,
{
    let n = targets.len();
    if n < 2 {
        return Err(Error::invalid(format!("need at least 2 observations, got {n}")));
    }
    let l = targets.iter().filter(|t| t.is_some()).count();
    if l == 0 || l == n {
        return Err(Error::invalid(format!(
            "need both labelled and unlabelled observations, got {l} labelled of {n}"
        )));
    }
    if targets[..l].iter().any(|t| t.is_none()) {
        return Err(Error::invalid(
            "target vector is not ordered labelled-first; reorder rows so all \
             known labels precede the unknowns",
        ));
    }

    let mut classes: Vec<L> = Vec::with_capacity(2);
    let mut class_of: Vec<usize> = Vec::with_capacity(l);
    for label in targets[..l].iter().flatten() {
        let idx = match classes.iter().position(|c| c == label) {
            Some(idx) => idx,
            None => {
                classes.push(label.clone());
                classes.len() - 1
            }
        };
        class_of.push(idx);
    }
    if classes.len() != 2 {
        return Err(Error::invalid(format!(
            "exactly 2 distinct class labels are required, found {}",
            classes.len()
        )));
    }

    let ids: Vec<String> = match ids {
        Some(supplied) => {
            if supplied.len() != n - l {
                return Err(Error::invalid(format!(
                    "expected {} identifiers for unlabelled observations, got {}",
                    n - l,
                    supplied.len()
                )));
            }
            supplied.to_vec()
        }
        None => (l..n).map(|row| (row + 1).to_string()).collect(),
    };

    let y = indicator_matrix(&class_of);
    let mut classes = classes.into_iter();
    let first = classes.next().unwrap();
    let second = classes.next().unwrap();
    Ok((y, [first, second], ids, l))
}

/// L×2 binary indicator from per-row class indices (0 or 1).
fn indicator_matrix(class_of: &[usize]) -> DenseMatrix<f64> {
    let mut y: DenseMatrix<f64> = DenseMatrix::zeros(class_of.len(), 2);
    for (row, &class) in class_of.iter().enumerate() {
        y.set((row, class), 1.0);
    }
    y
}
