use modelaudit::dataset::{Column, DatasetLoader, Label, TabularDataset};
use modelaudit::fairness::{BinaryLabels, FairnessMetricComputer, FairnessReport, SensitiveAttribute};
use modelaudit::model::ModelArtifact;
use modelaudit::{AuditError, Predictor};
use std::collections::BTreeSet;
use std::path::Path;

fn fixtures_path() -> &'static Path {
    Path::new("tests/fixtures")
}

fn load_fixtures() -> (TabularDataset, ModelArtifact) {
    let dataset = DatasetLoader::load(fixtures_path().join("iris_sample.csv")).unwrap();
    let model = ModelArtifact::load(fixtures_path().join("model_linear.json")).unwrap();
    (dataset, model)
}

/// Small deterministic generator so property checks don't depend on a seed crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

#[test]
fn test_ten_row_fairness_scenario() {
    let (dataset, model) = load_fixtures();
    assert_eq!(dataset.rows(), 10);

    let report = FairnessReport::build(&dataset, &model).unwrap();

    assert_eq!(report.sensitive_feature, "sepal_length_high_vs_low");
    let groups: Vec<_> = report.by_group.keys().cloned().collect();
    assert_eq!(groups, vec!["high_sepal_length", "low_sepal_length"]);

    // 8 of 10 predictions are correct (rows 4 and 9 are misclassified)
    assert!((report.overall["accuracy"] - 0.8).abs() < 1e-12);
    assert!((report.overall["selection_rate"] - 0.5).abs() < 1e-12);

    assert!((report.by_group["low_sepal_length"]["accuracy"] - 0.8).abs() < 1e-12);
    assert_eq!(report.by_group["low_sepal_length"]["selection_rate"], 1.0);
    assert_eq!(report.by_group["high_sepal_length"]["selection_rate"], 0.0);
    assert_eq!(report.demographic_parity_difference, 1.0);
    assert_eq!(report.equalized_odds_difference, 1.0);
}

#[test]
fn test_overall_accuracy_matches_unweighted_accuracy() {
    let (dataset, model) = load_fixtures();
    let report = FairnessReport::build(&dataset, &model).unwrap();

    let y_true = dataset.labels().unwrap();
    let y_pred = model.predict(&dataset.feature_matrix().unwrap()).unwrap();
    let correct = y_true.iter().zip(&y_pred).filter(|(t, p)| t == p).count();

    assert!((report.overall["accuracy"] - correct as f64 / y_true.len() as f64).abs() < 1e-12);
}

#[test]
fn test_report_json_is_reproducible() {
    let (dataset, model) = load_fixtures();
    let first = serde_json::to_string_pretty(&FairnessReport::build(&dataset, &model).unwrap()).unwrap();

    let (dataset, model) = load_fixtures();
    let second = serde_json::to_string_pretty(&FairnessReport::build(&dataset, &model).unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_report_json_shape() {
    let (dataset, model) = load_fixtures();
    let report = FairnessReport::build(&dataset, &model).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    for key in [
        "sensitive_feature",
        "overall",
        "by_group",
        "demographic_parity_difference",
        "equalized_odds_difference",
    ] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
}

#[test]
fn test_group_keys_equal_distinct_groups() {
    let mut rng = Lcg(7);
    for _ in 0..25 {
        let n = 2 + rng.below(40) as usize;
        let names = ["a", "b", "c", "d"];
        let mut groups: Vec<String> = (0..n).map(|_| names[rng.below(4) as usize].to_string()).collect();
        // guarantee at least two groups
        groups[0] = "a".to_string();
        groups[1] = "b".to_string();
        let y_true: Vec<bool> = (0..n).map(|_| rng.below(2) == 1).collect();
        let y_pred: Vec<bool> = (0..n).map(|_| rng.below(2) == 1).collect();

        let metrics = FairnessMetricComputer::compute(&y_true, &y_pred, &groups).unwrap();

        let expected: BTreeSet<_> = groups.iter().cloned().collect();
        let actual: BTreeSet<_> = metrics.frame.by_group.keys().cloned().collect();
        assert_eq!(actual, expected);

        assert!((0.0..=1.0).contains(&metrics.demographic_parity_difference));
        assert!((0.0..=1.0).contains(&metrics.equalized_odds_difference));
    }
}

#[test]
fn test_median_split_totality_on_fixture() {
    let (dataset, _) = load_fixtures();
    let attr = SensitiveAttribute::derive(&dataset).unwrap();

    let high = attr.groups.iter().filter(|g| *g == "high_sepal_length").count();
    let low = attr.groups.iter().filter(|g| *g == "low_sepal_length").count();
    assert_eq!(high, 5);
    assert_eq!(low, 5);
    assert_eq!(high + low, dataset.rows());
}

#[test]
fn test_binarization_uses_first_true_label() {
    let (dataset, _) = load_fixtures();
    let y_true = dataset.labels().unwrap();
    let bin = BinaryLabels::project(&y_true, &y_true).unwrap();
    assert_eq!(bin.positive, Label::Int(0));
    assert_eq!(bin.y_true, bin.y_pred);
}

#[test]
fn test_multiclass_labels_binarized_against_first() {
    let dataset = TabularDataset::new(vec![
        Column::numeric("petal_length", vec![1.4, 4.7, 6.0, 1.3, 4.5, 5.9]),
        Column::numeric("target", vec![2.0, 0.0, 1.0, 0.0, 2.0, 1.0]),
    ])
    .unwrap();
    let model = ModelArtifact::Constant { label: Label::Int(2) };

    let report = FairnessReport::build(&dataset, &model).unwrap();
    // every row predicted positive (class 2)
    assert_eq!(report.overall["selection_rate"], 1.0);
    assert!((report.overall["accuracy"] - 2.0 / 6.0).abs() < 1e-12);
    assert_eq!(report.demographic_parity_difference, 0.0);
}

#[test]
fn test_constant_feature_has_insufficient_groups() {
    let dataset = TabularDataset::new(vec![
        Column::numeric("x", vec![1.0; 5]),
        Column::numeric("target", vec![0.0, 1.0, 0.0, 1.0, 0.0]),
    ])
    .unwrap();
    let model = ModelArtifact::Constant { label: Label::Int(1) };

    let err = FairnessReport::build(&dataset, &model).unwrap_err();
    assert!(matches!(err, AuditError::InsufficientGroups(_)));
}

#[test]
fn test_missing_feature_cells_fail_the_fairness_audit() {
    let columns = DatasetLoader::csv_columns("a,b,target\n1.0,,0\n2.0,,0\n3.0,1.0,1\n4.0,2.0,1\n".as_bytes()).unwrap();
    let dataset = TabularDataset::new(columns).unwrap();
    let model = ModelArtifact::Linear {
        classes: vec![Label::Int(0), Label::Int(1)],
        coefficients: vec![vec![0.0, -1.0], vec![0.0, 1.0]],
        intercepts: vec![0.0, 0.0],
    };

    let err = FairnessReport::build(&dataset, &model).unwrap_err();
    assert!(matches!(err, AuditError::InvalidInput(_)));
    assert!(err.to_string().contains("row 0 has a missing value in feature 'b'"));
}
