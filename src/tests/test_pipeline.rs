use approx::assert_abs_diff_eq;

use crate::builder::HarmonicLabeler;
use crate::error::Error;
use crate::table::{Table, TableSpec, Value};
use crate::tests::{adjacency_from_edges, two_cluster_table};

fn spec() -> TableSpec {
    TableSpec::new("class", ["x", "y"])
}

#[test]
fn separated_clusters_yield_a_confident_prediction() {
    // Scenario: 4 labelled anchors in two distant clusters, one unlabelled
    // point sitting inside the first cluster, k = 1.
    let predictions = HarmonicLabeler::new()
        .with_k(1)
        .with_exact(true)
        .predict_table(&two_cluster_table(), &spec())
        .unwrap();

    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].id, "5");
    assert_eq!(predictions[0].label, Value::Text("a".into()));
    assert!(
        predictions[0].scores[0] > 0.9,
        "expected a confident class-a score, got {:?}",
        predictions[0].scores
    );
}

#[test]
fn unlabelled_cluster_without_label_anchors_is_singular_in_exact_mode() {
    // Two unlabelled points far from every labelled observation: with k = 1
    // they pick each other, leaving their component without a label anchor.
    let mut table = two_cluster_table();
    table
        .push_row(vec![100.0.into(), 100.0.into(), Value::Missing])
        .unwrap();
    table
        .push_row(vec![100.0.into(), 100.5.into(), Value::Missing])
        .unwrap();

    let err = HarmonicLabeler::new()
        .with_k(1)
        .with_exact(true)
        .predict_table(&table, &spec())
        .unwrap_err();
    assert!(matches!(err, Error::SingularSystem { .. }), "got {err:?}");
}

/// Imbalanced-prior graph: 9 "A" and 3 "B" labelled nodes, four unlabelled
/// nodes anchored to distinct "A" nodes, and one disputed node tied equally
/// to one "A" and one "B" anchor.
fn imbalanced_graph() -> (smartcore::linalg::basic::matrix::DenseMatrix<f64>, Vec<Option<&'static str>>)
{
    let edges = [
        (12, 0, 1.0),
        (13, 1, 1.0),
        (14, 2, 1.0),
        (15, 3, 1.0),
        (16, 4, 1.0),
        (16, 9, 1.0),
    ];
    let matrix = adjacency_from_edges(17, &edges);
    let mut targets: Vec<Option<&str>> = Vec::new();
    targets.extend(std::iter::repeat(Some("A")).take(9));
    targets.extend(std::iter::repeat(Some("B")).take(3));
    targets.extend(std::iter::repeat(None).take(5));
    (matrix, targets)
}

#[test]
fn cmn_corrects_the_disputed_node_toward_the_minority_class() {
    let (matrix, targets) = imbalanced_graph();

    let raw = HarmonicLabeler::new()
        .with_exact(true)
        .with_cmn(false)
        .predict_graph(matrix.clone(), &targets, None)
        .unwrap();
    // Without the prior correction the tie resolves to class 1 ("A").
    let disputed = raw.last().unwrap();
    assert_eq!(disputed.id, "17");
    assert_eq!(disputed.label, "A");
    assert!(disputed.cmn_scores.is_none());

    let adjusted = HarmonicLabeler::new()
        .with_exact(true)
        .with_cmn(true)
        .predict_graph(matrix, &targets, None)
        .unwrap();
    // Class "A" holds mass 4.5 against a 9:3 prior; the correction flips
    // the disputed node to the minority class.
    let disputed = adjusted.last().unwrap();
    assert_eq!(disputed.label, "B");
    let cmn = disputed.cmn_scores.unwrap();
    assert!(cmn[1] > cmn[0], "adjusted scores {cmn:?}");
    // Raw scores are reported unchanged next to the adjustment.
    assert_abs_diff_eq!(disputed.scores[0], 0.5, epsilon = 1e-12);
    // Anchored nodes keep their majority label either way.
    for prediction in adjusted.iter().take(4) {
        assert_eq!(prediction.label, "A");
    }
}

#[test]
fn exact_mode_is_bit_identical_across_calls() {
    let (matrix, targets) = imbalanced_graph();
    let labeler = HarmonicLabeler::new().with_exact(true);

    let first = labeler.predict_graph(matrix.clone(), &targets, None).unwrap();
    let second = labeler.predict_graph(matrix, &targets, None).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.label, b.label);
        // No hidden randomness: same bits, not just same tolerance.
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.cmn_scores, b.cmn_scores);
    }
}

#[test]
fn approximate_mode_is_repeatable_within_tolerance() {
    let labeler = HarmonicLabeler::new().with_k(2);
    let first = labeler.predict_table(&two_cluster_table(), &spec()).unwrap();
    let second = labeler.predict_table(&two_cluster_table(), &spec()).unwrap();

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.label, b.label);
        assert_abs_diff_eq!(a.scores[0], b.scores[0], epsilon = 1e-9);
        assert_abs_diff_eq!(a.scores[1], b.scores[1], epsilon = 1e-9);
    }
}

#[test]
fn approximate_scores_stay_inside_the_open_unit_interval() {
    let predictions = HarmonicLabeler::new()
        .with_k(2)
        .predict_table(&two_cluster_table(), &spec())
        .unwrap();
    for p in &predictions {
        assert!(p.scores[0] > 0.0 && p.scores[0] < 1.0, "scores {:?}", p.scores);
        assert!(p.scores[1] > 0.0 && p.scores[1] < 1.0, "scores {:?}", p.scores);
        assert_abs_diff_eq!(p.scores[0] + p.scores[1], 1.0, epsilon = 1e-15);
    }
}

#[test]
fn predictions_are_invariant_under_swapping_class_roles() {
    // Same geometry, but the "b" cluster appears first so it becomes
    // class 1 internally. The predicted label must not change.
    let swapped = Table::new(
        ["x", "y", "class"],
        vec![
            vec![10.0.into(), 10.0.into(), "b".into()],
            vec![10.0.into(), 11.0.into(), "b".into()],
            vec![0.0.into(), 0.0.into(), "a".into()],
            vec![0.0.into(), 1.0.into(), "a".into()],
            vec![0.2.into(), 0.5.into(), Value::Missing],
        ],
    )
    .unwrap();

    let original = HarmonicLabeler::new()
        .with_k(1)
        .with_exact(true)
        .predict_table(&two_cluster_table(), &spec())
        .unwrap();
    let reordered = HarmonicLabeler::new()
        .with_k(1)
        .with_exact(true)
        .predict_table(&swapped, &spec())
        .unwrap();

    assert_eq!(original[0].label, Value::Text("a".into()));
    assert_eq!(reordered[0].label, Value::Text("a".into()));
}

#[test]
fn asymmetric_caller_matrix_is_rejected_as_invalid_input() {
    use smartcore::linalg::basic::arrays::MutArray;

    let mut matrix = adjacency_from_edges(3, &[(0, 2, 1.0), (1, 2, 1.0)]);
    matrix.set((0, 1), 0.5); // no mirror entry
    let targets = vec![Some("a"), Some("b"), None];

    let err = HarmonicLabeler::new()
        .predict_graph(matrix, &targets, None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }), "got {err:?}");
    assert!(err.to_string().contains("not symmetric"), "got {err}");
}

#[test]
fn caller_supplied_ids_flow_through_the_graph_interface() {
    let matrix = adjacency_from_edges(3, &[(0, 2, 1.0), (1, 2, 1.0)]);
    let targets = vec![Some("a"), Some("b"), None];
    let ids = vec!["node-x".to_string()];

    let predictions = HarmonicLabeler::new()
        .with_exact(true)
        .predict_graph(matrix, &targets, Some(&ids))
        .unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].id, "node-x");
}
