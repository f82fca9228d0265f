//! Batch checks over the fixtures in `testdata/`.

use std::path::PathBuf;

use razencheck::analysis::DiagnosticRule;
use razencheck::config::Config;
use razencheck::report;
use razencheck::runner::Runner;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn load_config() -> Config {
    Config::parse_file(testdata_path().join("razencheck.yaml")).expect("should parse config")
}

fn run_fixtures() -> (Runner<'static>, razencheck::CheckResult) {
    let runner = Runner::new(load_config());
    let files = runner
        .collect_files(&testdata_path().join("scripts"))
        .expect("should collect files");
    let result = runner.run(&files);
    (runner, result)
}

fn file_name(path: &str) -> String {
    PathBuf::from(path)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_excluded_paths_are_skipped() {
    let (_, result) = run_fixtures();
    let names: Vec<String> = result.files.iter().map(|f| file_name(&f.path)).collect();
    assert_eq!(names, vec!["clean.rzn", "legacy.rzn", "mixed.rzn"]);
    assert_eq!(result.scanned, 3);
}

#[test]
fn test_clean_fixture_has_no_diagnostics() {
    let (_, result) = run_fixtures();
    let clean = result
        .files
        .iter()
        .find(|f| f.path.ends_with("clean.rzn"))
        .unwrap();
    assert!(clean.diagnostics.is_empty(), "{:#?}", clean.diagnostics);
}

#[test]
fn test_mixed_fixture_findings() {
    let (_, result) = run_fixtures();
    let mixed = result
        .files
        .iter()
        .find(|f| f.path.ends_with("mixed.rzn"))
        .unwrap();
    let found: Vec<(u32, DiagnosticRule)> = mixed
        .diagnostics
        .iter()
        .map(|d| (d.range.start.line, d.rule))
        .collect();
    assert_eq!(
        found,
        vec![
            (1, DiagnosticRule::UnknownImport),
            (4, DiagnosticRule::KindMismatch),
            (5, DiagnosticRule::ReturnKindMismatch),
            (6, DiagnosticRule::KindMismatch),
            (8, DiagnosticRule::UnknownLibrary),
            (9, DiagnosticRule::UnknownFunction),
            (10, DiagnosticRule::DeprecatedCall),
        ]
    );
    assert_eq!(mixed.error_count(), 2);
    assert_eq!(mixed.warning_count(), 5);
}

#[test]
fn test_run_fails_on_errors() {
    let (runner, result) = run_fixtures();
    assert_eq!(result.error_count(), 2);
    assert_eq!(result.warning_count(), 7);
    assert!(!result.passed(runner.config()));
}

#[test]
fn test_json_report() {
    let (runner, result) = run_fixtures();
    let json = report::build_json("testdata/scripts", &result, runner.config());
    assert!(!json.passed);
    assert_eq!(json.files_scanned, 3);
    assert_eq!(json.errors, 2);
    assert_eq!(json.diagnostics.len(), 9);

    let deprecated = json
        .diagnostics
        .iter()
        .find(|d| d.rule == "deprecated_call" && d.file.ends_with("mixed.rzn"))
        .unwrap();
    assert_eq!((deprecated.line, deprecated.column), (11, 1));
    assert_eq!(deprecated.fix.as_deref(), Some("deprecated-call-form"));

    let value = serde_json::to_value(&json).unwrap();
    for field in ["version", "path", "passed", "files_scanned", "errors", "warnings", "diagnostics"] {
        assert!(value.get(field).is_some(), "missing field {}", field);
    }
    assert!(value.get("skipped").is_none());
}

#[test]
fn test_sarif_report() {
    let (_, result) = run_fixtures();
    let base = testdata_path().join("scripts").canonicalize().unwrap();
    let sarif = report::build_sarif(&base, &result);
    let value = serde_json::to_value(&sarif).unwrap();
    assert_eq!(value["version"], "2.1.0");
    assert_eq!(value["runs"][0]["tool"]["driver"]["name"], "razencheck");

    let rules = value["runs"][0]["tool"]["driver"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), DiagnosticRule::ALL.len());

    let results = value["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 9);
    let region = &results[0]["locations"][0]["physicalLocation"]["region"];
    assert!(region["startLine"].as_u64().unwrap() >= 1);
    assert!(region["startColumn"].as_u64().unwrap() >= 1);
}

#[test]
fn test_fix_all_clears_legacy_fixture() {
    let text = std::fs::read_to_string(testdata_path().join("scripts/legacy.rzn")).unwrap();
    let analyzer = razencheck::Analyzer::default();
    assert_eq!(analyzer.analyze("legacy", &text).diagnostics.len(), 2);

    let (fixed, applied) = analyzer.fix_all(&text);
    assert_eq!(applied, 2);
    assert!(fixed.contains("strlib::upper(name)"));
    assert!(fixed.contains("arrlib::unique([1, 1, 2])"));
    assert!(analyzer.analyze("legacy", &fixed).diagnostics.is_empty());
}
