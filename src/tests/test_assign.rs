use approx::assert_abs_diff_eq;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::assign::{assign_classes, column_sums, Prediction};
use crate::table::Value;

fn ids(n: usize) -> Vec<String> {
    (1..=n).map(|i| i.to_string()).collect()
}

#[test]
fn argmax_prefers_class_one_on_equal_scores() {
    let y_hat = DenseMatrix::from_2d_vec(&vec![vec![0.5, 0.5]]).unwrap();
    let predictions = assign_classes(&y_hat, &["a", "b"], &ids(1), None);
    assert_eq!(predictions[0].label, "a");
    assert_eq!(predictions[0].scores, [0.5, 0.5]);
    assert!(predictions[0].cmn_scores.is_none());
}

#[test]
fn column_sums_accumulate_both_classes() {
    let y = DenseMatrix::from_2d_vec(&vec![
        vec![1.0, 0.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
    ])
    .unwrap();
    assert_eq!(column_sums(&y), [2.0, 1.0]);
}

#[test]
fn cmn_flips_a_tied_score_toward_the_underrepresented_class() {
    // Four confident class-1 votes plus one tie. With a 9:3 label prior the
    // class-1 mass (4.5) dwarfs its prior share while class 2's mass (0.5)
    // undershoots, so the tie is pulled to class 2.
    let y_hat = DenseMatrix::from_2d_vec(&vec![
        vec![1.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 0.0],
        vec![0.5, 0.5],
    ])
    .unwrap();

    let raw = assign_classes(&y_hat, &["a", "b"], &ids(5), None);
    assert_eq!(raw[4].label, "a"); // tie-break

    let adjusted = assign_classes(&y_hat, &["a", "b"], &ids(5), Some([9.0, 3.0]));
    assert_eq!(adjusted[4].label, "b");
    let cmn = adjusted[4].cmn_scores.unwrap();
    assert_abs_diff_eq!(cmn[0], 0.5 * 9.0 / 4.5, epsilon = 1e-12);
    assert_abs_diff_eq!(cmn[1], 0.5 * 3.0 / 0.5, epsilon = 1e-12);
    // Confident rows keep their class.
    assert_eq!(adjusted[0].label, "a");
    // Raw scores are still reported alongside the adjustment.
    assert_eq!(adjusted[4].scores, [0.5, 0.5]);
}

#[test]
fn uniform_prior_with_balanced_mass_preserves_raw_decisions() {
    let y_hat = DenseMatrix::from_2d_vec(&vec![
        vec![0.8, 0.2],
        vec![0.2, 0.8],
        vec![0.6, 0.4],
        vec![0.4, 0.6],
    ])
    .unwrap();

    let raw = assign_classes(&y_hat, &["a", "b"], &ids(4), None);
    let adjusted = assign_classes(&y_hat, &["a", "b"], &ids(4), Some([5.0, 5.0]));
    for (r, a) in raw.iter().zip(&adjusted) {
        assert_eq!(r.label, a.label);
    }
    // Balanced mass means the scale factor is identical per column, so the
    // adjusted scores are the raw scores up to one constant.
    let cmn = adjusted[0].cmn_scores.unwrap();
    let scale = cmn[0] / adjusted[0].scores[0];
    assert_abs_diff_eq!(cmn[1] / adjusted[0].scores[1], scale, epsilon = 1e-12);
}

#[test]
fn prediction_records_survive_a_serde_round_trip() {
    let prediction = Prediction {
        id: "7".to_string(),
        scores: [0.75, 0.25],
        cmn_scores: Some([0.9, 0.1]),
        label: Value::Text("a".into()),
    };
    let json = serde_json::to_string(&prediction).unwrap();
    let restored: Prediction<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, prediction);
}

#[test]
fn zero_class_mass_leaves_that_column_unscaled() {
    let y_hat = DenseMatrix::from_2d_vec(&vec![vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();
    let predictions = assign_classes(&y_hat, &["a", "b"], &ids(2), Some([1.0, 1.0]));
    for p in &predictions {
        assert_eq!(p.label, "a");
        let cmn = p.cmn_scores.unwrap();
        assert!(cmn[0].is_finite() && cmn[1].is_finite());
    }
}
