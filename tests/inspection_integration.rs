//! Integration tests running the inspector against the Python fixtures in
//! `testdata/`.

use std::path::PathBuf;

use globset::GlobSet;
use pyinspect::config::InspectorConfig;
use pyinspect::detect::{ConstructKind, InspectError, Inspector, Report, StyleRule};
use pyinspect::scan::{collect_files, Scanner};
use pyinspect::syntax::PythonParser;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn inspect(name: &str) -> Result<Report, InspectError> {
    let inspector = Inspector::new(&InspectorConfig::default()).expect("default config");
    inspector.inspect_file(&testdata_path().join(name), &PythonParser::new())
}

#[test]
fn test_clean_fixture_has_no_issues() {
    let report = inspect("clean.py").expect("clean.py should inspect");

    assert!(report.is_clean(), "unexpected issues: {:?}", report);

    let findings = report.complexity_analysis.findings();
    let summary: Vec<(String, u32, String)> = findings
        .iter()
        .map(|f| (f.qualified_name(), f.complexity, f.lines.to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("add".to_string(), 1, "4-5".to_string()),
            ("Counter".to_string(), 2, "8-15".to_string()),
            ("Counter.__init__".to_string(), 1, "9-10".to_string()),
            ("Counter.bump".to_string(), 2, "12-15".to_string()),
            ("read_config".to_string(), 1, "18-20".to_string()),
        ]
    );
    assert_eq!(findings[0].kind, ConstructKind::Function);
    assert_eq!(findings[1].kind, ConstructKind::Class);
    assert_eq!(findings[2].kind, ConstructKind::Method);
}

#[test]
fn test_messy_fixture() {
    let report = inspect("messy.py").expect("messy.py should inspect");

    let findings = report.complexity_analysis.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].name, "Process");
    assert_eq!(findings[0].complexity, 5);
    assert_eq!(findings[0].lines.to_string(), "4-11");

    let issues: Vec<(StyleRule, usize)> = report
        .style_issues
        .iter()
        .map(|i| (i.rule, i.line))
        .collect();
    assert_eq!(
        issues,
        vec![
            (StyleRule::LineLength, 15),
            (StyleRule::Naming, 5),
            (StyleRule::Naming, 6),
            (StyleRule::Naming, 8),
            (StyleRule::Naming, 11),
        ]
    );
    assert_eq!(
        report.style_issues[2].message,
        "Variable name 'Items' does not follow PEP 8"
    );

    assert_eq!(report.potential_bugs.len(), 1);
    assert_eq!(report.potential_bugs[0].line, 14);
}

#[test]
fn test_resources_fixture() {
    let report = inspect("resources.py").expect("resources.py should inspect");

    let lines: Vec<usize> = report.potential_bugs.iter().map(|b| b.line).collect();
    assert_eq!(lines, vec![2]);

    let scores: Vec<u32> = report
        .complexity_analysis
        .findings()
        .iter()
        .map(|f| f.complexity)
        .collect();
    assert_eq!(scores, vec![1, 1, 2]);
}

#[test]
fn test_broken_fixture_fails_to_parse() {
    let err = inspect("broken.py").unwrap_err();
    assert!(matches!(err, InspectError::Parse(_)));
}

#[test]
fn test_directory_run_skips_broken_file() {
    let files = collect_files(&testdata_path(), &GlobSet::empty()).expect("collect");
    assert_eq!(files.len(), 4);

    let scanner = Scanner::new(Inspector::new(&InspectorConfig::default()).unwrap());
    let outcome = scanner.scan(&files);

    assert_eq!(outcome.files_inspected(), 3);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].path.ends_with("broken.py"));

    let names: Vec<String> = outcome
        .reports
        .iter()
        .map(|r| {
            PathBuf::from(&r.file)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec!["clean.py", "messy.py", "resources.py"]);
    assert!(outcome.has_findings());
}

#[test]
fn test_parallel_run_is_identical() {
    let files = collect_files(&testdata_path(), &GlobSet::empty()).unwrap();
    let scanner = Scanner::new(Inspector::new(&InspectorConfig::default()).unwrap());

    let sequential = scanner.scan(&files);
    let parallel = scanner.scan_parallel(&files);
    assert_eq!(sequential.reports, parallel.reports);
    assert_eq!(sequential.skipped, parallel.skipped);
}

#[test]
fn test_config_changes_thresholds() {
    let config = InspectorConfig::parse_str(
        "max_line_length: 120\nnaming_pattern: \"^[A-Za-z_][A-Za-z0-9_]*$\"\n",
    )
    .unwrap();
    let inspector = Inspector::new(&config).unwrap();
    let report = inspector
        .inspect_file(&testdata_path().join("messy.py"), &PythonParser::new())
        .unwrap();

    assert!(report.style_issues.is_empty());
    assert_eq!(report.potential_bugs.len(), 1);
    assert_eq!(report.complexity_analysis.findings()[0].complexity, 5);
}
