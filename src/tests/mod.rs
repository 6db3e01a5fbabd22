mod test_assign;
mod test_pipeline;

use smartcore::linalg::basic::arrays::{Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::table::{Table, Value};

/// Route crate logs through env_logger so `RUST_LOG=debug cargo test`
/// shows the pipeline stages. Safe to call from every test.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two well-separated clusters with one unlabelled point near the first:
/// classes "a" at (0,0)/(0,1), "b" at (10,10)/(10,11), unknown at (0.2, 0.5).
pub fn two_cluster_table() -> Table {
    init_test_logging();
    Table::new(
        ["x", "y", "class"],
        vec![
            vec![0.0.into(), 0.0.into(), "a".into()],
            vec![0.0.into(), 1.0.into(), "a".into()],
            vec![10.0.into(), 10.0.into(), "b".into()],
            vec![10.0.into(), 11.0.into(), "b".into()],
            vec![0.2.into(), 0.5.into(), Value::Missing],
        ],
    )
    .unwrap()
}

/// Symmetric dense matrix from an edge list (unit weights unless given).
pub fn adjacency_from_edges(n: usize, edges: &[(usize, usize, f64)]) -> DenseMatrix<f64> {
    init_test_logging();
    let mut matrix: DenseMatrix<f64> = DenseMatrix::zeros(n, n);
    for &(i, j, w) in edges {
        matrix.set((i, j), w);
        matrix.set((j, i), w);
    }
    matrix
}
