//! Tests for the JSON and ctags output formats.

use std::path::PathBuf;

use bracetag::report::{self, JsonReport};
use bracetag::{FileScan, Runner};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn scan_fixtures() -> Vec<FileScan> {
    bracetag::init();
    let testdata = testdata_path();
    let files = vec![testdata.join("TestClass.java"), testdata.join("Shapes.java")];
    Runner::new(&testdata)
        .run(&files, None)
        .expect("scan should succeed")
}

#[test]
fn test_json_structure() {
    let mut out = Vec::new();
    report::write_json(&mut out, &scan_fixtures()).expect("write json");

    let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(value["symbol_count"], 13);
    assert_eq!(value["diagnostic_count"], 1);

    let files = value["files"].as_array().expect("files array");
    assert_eq!(files[0]["path"], "Shapes.java");
    assert_eq!(files[1]["path"], "TestClass.java");

    let test1 = &files[1]["symbols"][2];
    assert_eq!(test1["name"], "test1");
    assert_eq!(test1["kind"], "method");
    assert_eq!(test1["modifiers"], serde_json::json!(["public", "static"]));
    assert_eq!(test1["parameter_list_text"], "String blah");
    assert_eq!(test1["start_line"], 20);
    assert_eq!(test1["enclosing_scope_path"], serde_json::json!(["TestClass"]));
    assert!(test1.get("doc_comment").is_none());

    let diagnostic = &files[1]["diagnostics"][0];
    assert_eq!(diagnostic["kind"], "unbalanced_braces");
    assert_eq!(diagnostic["severity"], "warning");

    let stats = &files[1]["stats"];
    assert_eq!(stats["force_closed"], 3);
}

#[test]
fn test_json_round_trips_into_report() {
    let mut out = Vec::new();
    report::write_json(&mut out, &scan_fixtures()).expect("write json");
    let report: JsonReport = serde_json::from_slice(&out).expect("deserialize report");
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[1].symbols[0].name, "main");
}

#[test]
fn test_ctags_format() {
    let mut out = Vec::new();
    report::write_ctags(&mut out, &scan_fixtures()).expect("write ctags");
    let text = String::from_utf8(out).expect("utf-8");

    let header: Vec<&str> = text.lines().take_while(|l| l.starts_with("!_TAG_")).collect();
    assert_eq!(header.len(), 4);

    let entries: Vec<&str> = text.lines().skip(header.len()).collect();
    assert_eq!(entries.len(), 13);

    let names: Vec<&str> = entries
        .iter()
        .map(|l| l.split('\t').next().unwrap_or(""))
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted, "entries must be sorted by name");

    assert!(entries.contains(&"test1\tTestClass.java\t20;\"\tm\tclass:TestClass"));
    assert!(entries.contains(
        &"innerTest1\tTestClass.java\t14;\"\tm\tclass:TestClass.main.<anonymous>"
    ));
    // two `describe` entries sorted by file then line
    let describe: Vec<&&str> = entries.iter().filter(|l| l.starts_with("describe\t")).collect();
    assert_eq!(describe.len(), 2);
    assert!(describe[0].contains("\t11;\""));
    assert!(describe[1].contains("\t26;\""));
}
