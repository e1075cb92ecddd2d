//! Integration tests for multi-file scanning and user profiles.

use std::path::PathBuf;

use bracetag::profile::{self, LanguageProfile};
use bracetag::{collect_files, Runner};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn setup() {
    bracetag::init();
}

#[test]
fn test_runner_over_testdata() {
    setup();
    let testdata = testdata_path();
    let files = collect_files(&testdata).expect("should walk testdata");
    assert!(files.len() >= 3, "{:?}", files);

    let scans = Runner::new(&testdata)
        .run(&files, None)
        .expect("scan should succeed");

    let paths: Vec<_> = scans.iter().map(|s| s.path.clone()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted, "results must be sorted by path");

    let fixture = scans
        .iter()
        .find(|s| s.path == PathBuf::from("TestClass.java"))
        .expect("fixture scanned");
    assert_eq!(fixture.language, "java");
    assert_eq!(fixture.result.symbols.len(), 5);
    assert_eq!(fixture.result.diagnostics.len(), 1);

    let csharp = scans
        .iter()
        .find(|s| s.path == PathBuf::from("Inventory.cs"))
        .expect("C# fixture scanned");
    assert_eq!(csharp.language, "csharp");
    assert_eq!(csharp.result.symbols.len(), 7);
    assert!(csharp.result.diagnostics.is_empty());
}

#[test]
fn test_exclude_glob() {
    setup();
    let testdata = testdata_path();
    let files = collect_files(&testdata).expect("should walk testdata");

    let scans = Runner::new(&testdata)
        .exclude(&["Test*.java"])
        .expect("valid glob")
        .run(&files, None)
        .expect("scan should succeed");
    assert!(scans.iter().all(|s| s.path != PathBuf::from("TestClass.java")));
    assert!(scans.iter().any(|s| s.path == PathBuf::from("Shapes.java")));
}

#[test]
fn test_invalid_glob_is_error() {
    assert!(Runner::new(".").exclude(&["a/**/[unclosed"]).is_err());
}

#[test]
fn test_user_profile_from_file() {
    setup();
    let path = testdata_path().join("profiles").join("groovy.yaml");
    let groovy = LanguageProfile::parse_file(&path).expect("profile should parse");
    assert_eq!(groovy.name, "groovy");
    assert!(groovy.handles_extension("gvy"));
    // comment markers fall back to the C-family defaults
    assert_eq!(groovy.comments.line.as_deref(), Some("//"));

    profile::register(groovy).expect("profile should register");

    let temp = tempfile::tempdir().expect("tempdir");
    let script = temp.path().join("Greeter.groovy");
    std::fs::write(
        &script,
        "class Greeter {\n  def greet(String name) {\n    println 'hi {' + name\n  }\n}\n",
    )
    .expect("write script");

    let scans = Runner::new(temp.path())
        .run(&[script], None)
        .expect("scan should succeed");
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].language, "groovy");
    let symbols = &scans[0].result.symbols;
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "greet");
    assert_eq!(symbols[0].enclosing_scope_path, vec!["Greeter"]);
    assert!(scans[0].result.diagnostics.is_empty());
}
