use std::fs;
use std::path::Path;

use ideal_match::data::writer::write_results;
use ideal_match::matching::observer::NoopObserver;
use ideal_match::run::{RunInputs, execute};
use ideal_match::{MatchConfig, MatchError};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Two training series on x = 0..4, four ideal functions.
fn write_fixture(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let train = write(
        dir,
        "train.csv",
        "X,Y1,Y2\n0,0.1,5\n1,1.0,4.2\n2,2.1,3\n3,2.9,2\n4,4.0,1\n",
    );
    let ideal = write(
        dir,
        "ideal.csv",
        "x,y1,y2,y3,y4\n0,5,0,10,0\n1,4,1,10,0\n2,3,2,10,0\n3,2,3,10,0\n4,1,4,10,0\n",
    );
    let test = write(
        dir,
        "test.csv",
        "x,y\n1,1.05\n2,3.1\n3,10\n2.5,2.5\n4,0.95\n",
    );
    (train, ideal, test)
}

#[test]
fn csv_fixture_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let (train, ideal, test) = write_fixture(tmp.path());

    let inputs = RunInputs::load(&train, &ideal, &test).unwrap();
    let outcome = execute(&inputs, &MatchConfig::default(), &NoopObserver).unwrap();

    // headers were lower-cased on load
    assert_eq!(outcome.best.get("y1"), Some("y2"));
    assert_eq!(outcome.best.get("y2"), Some("y1"));

    let assigned: Vec<Option<&str>> = outcome
        .results
        .iter()
        .map(|r| r.assigned.as_deref())
        .collect();
    // max_dev(y1) = √2·0.1, max_dev(y2) = √2·0.2
    assert_eq!(
        assigned,
        vec![Some("y2"), Some("y1"), None, None, Some("y1")]
    );
    let d0 = outcome.results[0].deviation.unwrap();
    assert!((d0 - 0.05).abs() < 1e-9);

    let out = tmp.path().join("results.csv");
    write_results(&out, &outcome.results).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("x,y,delta_y,assigned_reference_id"));
    assert_eq!(lines.nth(2), Some("3,10,,"));
}

#[test]
fn json_inputs_match_csv_inputs() {
    let tmp = TempDir::new().unwrap();
    let (train, ideal, test) = write_fixture(tmp.path());
    let from_csv = execute(
        &RunInputs::load(&train, &ideal, &test).unwrap(),
        &MatchConfig::default(),
        &NoopObserver,
    )
    .unwrap();

    let train_json = write(
        tmp.path(),
        "train.json",
        r#"{"x":[0,1,2,3,4],"y1":[0.1,1.0,2.1,2.9,4.0],"y2":[5,4.2,3,2,1]}"#,
    );
    let ideal_json = write(
        tmp.path(),
        "ideal.json",
        r#"[{"x":0,"y1":5,"y2":0,"y3":10,"y4":0},{"x":1,"y1":4,"y2":1,"y3":10,"y4":0},
            {"x":2,"y1":3,"y2":2,"y3":10,"y4":0},{"x":3,"y1":2,"y2":3,"y3":10,"y4":0},
            {"x":4,"y1":1,"y2":4,"y3":10,"y4":0}]"#,
    );
    let from_json = execute(
        &RunInputs::load(&train_json, &ideal_json, &test).unwrap(),
        &MatchConfig::default(),
        &NoopObserver,
    )
    .unwrap();

    assert_eq!(from_csv.best, from_json.best);
    assert_eq!(from_csv.results, from_json.results);
}

#[test]
fn test_file_without_y_is_invalid_input() {
    let tmp = TempDir::new().unwrap();
    let (train, ideal, _) = write_fixture(tmp.path());
    let test = write(tmp.path(), "bad.csv", "x,value\n1,1\n");
    let inputs = RunInputs::load(&train, &ideal, &test).unwrap();
    let err = execute(&inputs, &MatchConfig::default(), &NoopObserver).unwrap_err();
    assert!(matches!(err, MatchError::InvalidInput(_)));
}

#[test]
fn header_only_ideal_file_leaves_all_unassigned() {
    let tmp = TempDir::new().unwrap();
    let (train, _, test) = write_fixture(tmp.path());
    let ideal = write(tmp.path(), "empty.csv", "x,y1\n");
    let inputs = RunInputs::load(&train, &ideal, &test).unwrap();
    let outcome = execute(&inputs, &MatchConfig::default(), &NoopObserver).unwrap();
    assert!(outcome.best.is_empty());
    assert_eq!(outcome.results.len(), 5);
    assert_eq!(outcome.assigned_count(), 0);
}

#[test]
fn missing_file_names_the_table() {
    let tmp = TempDir::new().unwrap();
    let (train, ideal, _) = write_fixture(tmp.path());
    let err = RunInputs::load(&train, &ideal, &tmp.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("loading observations"));
}
