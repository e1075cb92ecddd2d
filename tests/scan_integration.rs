//! Integration tests for the scan pipeline against the testdata fixtures.

use std::path::PathBuf;

use bracetag::scan::{Grammar, Lexer, ScanResult, Scanner, TokenKind, ANONYMOUS_SEGMENT};
use bracetag::{DiagnosticKind, SymbolKind};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(testdata_path().join(name)).expect("should read fixture")
}

fn scan_fixture(name: &str) -> ScanResult {
    Scanner::new(Grammar::java()).scan(&read_fixture(name))
}

fn csharp() -> Grammar {
    bracetag::profile::builtin("csharp")
        .and_then(|p| p.compile())
        .expect("csharp profile should compile")
}

fn names(result: &ScanResult) -> Vec<&str> {
    result.symbols.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn test_fixture_symbols_in_source_order() {
    let result = scan_fixture("TestClass.java");
    assert_eq!(
        names(&result),
        vec!["main", "innerTest1", "test1", "test2", "test3"]
    );

    let lines: Vec<usize> = result.symbols.iter().map(|s| s.start_line).collect();
    assert_eq!(lines, vec![7, 14, 20, 24, 32]);
}

#[test]
fn test_fixture_call_is_not_a_declaration() {
    let result = scan_fixture("TestClass.java");
    // test1() is called in main and test3 but declared once
    assert_eq!(result.symbols_named("test1").count(), 1);
}

#[test]
fn test_fixture_public_static_method() {
    let result = scan_fixture("TestClass.java");
    let test1 = result.symbols_named("test1").next().expect("test1 declared");
    assert_eq!(test1.kind, SymbolKind::Method);
    assert_eq!(test1.modifiers, vec!["public", "static"]);
    assert_eq!(test1.parameter_list_text, "String blah");
    assert_eq!(test1.enclosing_scope_path, vec!["TestClass"]);
    assert_eq!(test1.doc_comment, None);

    let test2 = result.symbols_named("test2").next().expect("test2 declared");
    assert_eq!(test2.modifiers, vec!["private", "final", "static"]);
    assert_eq!(test2.parameter_list_text, "");
}

#[test]
fn test_fixture_anonymous_class_method() {
    let result = scan_fixture("TestClass.java");
    let inner = result
        .symbols_named("innerTest1")
        .next()
        .expect("innerTest1 declared");
    assert_eq!(
        inner.enclosing_scope_path.last().map(String::as_str),
        Some(ANONYMOUS_SEGMENT)
    );
    assert_eq!(inner.qualified_name(), "TestClass.main.<anonymous>.innerTest1");
    // nothing emitted for the construction itself
    assert!(result.symbols_named("InnerClass").next().is_none());
}

#[test]
fn test_fixture_doc_comments() {
    let result = scan_fixture("TestClass.java");
    let main = &result.symbols[0];
    assert_eq!(main.doc_summary().as_deref(), Some("Entry point."));

    // the class doc comment is discarded while type symbols are off
    for symbol in &result.symbols {
        assert_ne!(symbol.doc_comment.as_deref(), Some("/** Comment */"));
    }
    // the block comment before `new InnerClass()` belongs to no declaration
    assert_eq!(result.symbols[1].doc_comment, None);
}

#[test]
fn test_fixture_class_symbol_when_enabled() {
    let grammar = Grammar::java().with_type_symbols(true);
    let result = Scanner::new(&grammar).scan(&read_fixture("TestClass.java"));
    let class = &result.symbols[0];
    assert_eq!(class.name, "TestClass");
    assert_eq!(class.kind, SymbolKind::Type);
    assert_eq!(class.doc_comment.as_deref(), Some("/** Comment */"));
    assert_eq!(result.symbols.len(), 6);
}

#[test]
fn test_fixture_truncated_try_reports_once() {
    let result = scan_fixture("TestClass.java");
    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    let d = &result.diagnostics[0];
    assert_eq!(d.kind, DiagnosticKind::UnbalancedBraces);
    assert!(d.message.contains("3 unclosed"), "{}", d.message);
    assert!(d.message.contains("line 33"), "{}", d.message);

    assert_eq!(result.stats.force_closed, 3);
    assert_eq!(
        result.stats.pushed,
        result.stats.popped + result.stats.force_closed
    );
}

#[test]
fn test_braces_in_literals_and_comments_are_inert() {
    let source = read_fixture("TestClass.java");
    let structural = Lexer::new(&source, Grammar::java())
        .filter(|t| t.is_punct('{') || t.is_punct('}'))
        .count();
    let in_text = Lexer::new(&source, Grammar::java())
        .filter(|t| t.kind.is_comment() || t.kind.is_literal())
        .filter(|t| t.text.contains('{') || t.text.contains('}'))
        .count();
    assert_eq!(in_text, 5);
    // 10 opening and 7 closing braces in code
    assert_eq!(structural, 17);
}

#[test]
fn test_shapes_fixture() {
    let result = scan_fixture("Shapes.java");
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        names(&result),
        vec!["area", "describe", "Polygon", "corners", "describe", "apply", "largest", "Kind"]
    );

    let area = &result.symbols[0];
    assert_eq!(area.enclosing_scope_path, vec!["Shape"]);
    assert_eq!(area.doc_summary().as_deref(), Some("Area in square units."));

    let ctor = &result.symbols[2];
    assert_eq!(ctor.kind, SymbolKind::Constructor);
    assert_eq!(ctor.modifiers, vec!["protected"]);

    let corners = &result.symbols[3];
    assert_eq!(corners.modifiers, vec!["public", "abstract"]);

    let describe = &result.symbols[4];
    assert_eq!(describe.start_line, 25);
    assert_eq!(describe.span.line, 26);

    let apply = &result.symbols[5];
    assert_eq!(
        apply.enclosing_scope_path,
        vec!["Polygon", "describe", ANONYMOUS_SEGMENT]
    );

    let largest = &result.symbols[6];
    assert_eq!(largest.parameter_list_text, "List<? extends R> values");
    assert_eq!(largest.enclosing_scope_path, vec!["Polygon"]);

    let kind = &result.symbols[7];
    assert_eq!(kind.kind, SymbolKind::Constructor);
    assert_eq!(kind.enclosing_scope_path, vec!["Polygon", "Kind"]);
}

#[test]
fn test_scan_is_deterministic() {
    let source = read_fixture("Shapes.java");
    let scanner = Scanner::new(Grammar::java());
    assert_eq!(scanner.scan(&source), scanner.scan(&source));
}

#[test]
fn test_every_prefix_recovers() {
    let source = read_fixture("Shapes.java");
    let scanner = Scanner::new(Grammar::java());
    let full = scanner.scan(&source);

    for (end, _) in source.char_indices() {
        let partial = scanner.scan(&source[..end]);
        let stats = partial.stats;
        assert_eq!(stats.pushed, stats.popped + stats.force_closed, "prefix {}", end);

        let eof_reports = partial
            .diagnostics
            .iter()
            .filter(|d| d.kind.is_structural())
            .count();
        assert!(eof_reports <= 1, "prefix {}: {:?}", end, partial.diagnostics);

        assert!(
            full.symbols.starts_with(&partial.symbols),
            "prefix {} produced symbols not in the full scan",
            end
        );
    }
}

#[test]
fn test_restart_mid_file() {
    let source = read_fixture("TestClass.java");
    let offset = source.find("public static String test1").expect("declaration present");
    let first = Lexer::starting_at(&source, Grammar::java(), offset)
        .significant()
        .next()
        .expect("token");
    assert_eq!(first.kind, TokenKind::Keyword);
    assert_eq!(first.text, "public");
    assert_eq!(first.line, 20);
    assert_eq!(first.column, 5);
}

#[test]
fn test_csharp_fixture() {
    let grammar = csharp();
    let result = Scanner::new(&grammar).scan(&read_fixture("Inventory.cs"));
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        names(&result),
        vec!["Item", "Price", "Widget", "Widget", "Get", "Price", "Path"]
    );

    let kinds: Vec<SymbolKind> = result.symbols.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SymbolKind::Constructor,
            SymbolKind::Method,
            SymbolKind::Constructor,
            SymbolKind::Constructor,
            SymbolKind::Method,
            SymbolKind::Method,
            SymbolKind::Method,
        ]
    );

    let item = &result.symbols[0];
    assert_eq!(item.enclosing_scope_path, vec!["Item"]);
    assert_eq!(item.modifiers, vec!["protected"]);

    let chained = &result.symbols[2];
    assert_eq!(chained.parameter_list_text, "string sku");
    assert_eq!(chained.start_line, 22);
    assert_eq!(chained.enclosing_scope_path, vec!["Widget"]);

    let get = &result.symbols[4];
    assert_eq!(get.start_line, 27);
    assert_eq!(get.parameter_list_text, "int id");
    assert_eq!(get.doc_summary().as_deref(), Some("Look up a typed value."));

    let price = &result.symbols[5];
    assert_eq!(price.modifiers, vec!["public", "override"]);
    assert_eq!(price.start_line, 36);

    let path = &result.symbols[6];
    assert_eq!(path.modifiers, vec!["internal", "static"]);
    assert_eq!(path.start_line, 38);
    assert_eq!(path.span.line, 39);
}

#[test]
fn test_csharp_verbatim_string_does_not_swallow_code() {
    let grammar = csharp();
    let result = Scanner::new(&grammar)
        .scan("class D {\n  string p = @\"C:\\dir\\\";\n  public void H() { }\n}\n");
    assert_eq!(names(&result), vec!["H"]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert!(!result.has_warnings());
}

#[test]
fn test_csharp_every_prefix_recovers() {
    let grammar = csharp();
    let source = read_fixture("Inventory.cs");
    let scanner = Scanner::new(&grammar);
    let full = scanner.scan(&source);

    for (end, _) in source.char_indices() {
        let partial = scanner.scan(&source[..end]);
        let stats = partial.stats;
        assert_eq!(stats.pushed, stats.popped + stats.force_closed, "prefix {}", end);
        assert!(
            full.symbols.starts_with(&partial.symbols),
            "prefix {} produced symbols not in the full scan",
            end
        );
    }
}

#[test]
fn test_sealed_hierarchy() {
    let source = "public sealed class Shape permits Square {}\n\
                  non-sealed class Square extends Shape {\n  Square() {}\n  void f() {}\n}\n";
    let result = Scanner::new(Grammar::java()).scan(source);
    assert_eq!(names(&result), vec!["Square", "f"]);
    assert_eq!(result.symbols[0].kind, SymbolKind::Constructor);
    assert_eq!(result.symbols[1].enclosing_scope_path, vec!["Square"]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_annotation_type_elements() {
    let source = "@interface Route {\n  String value() default \"/\";\n  int[] codes() default {200};\n  <T> T get(Class<T> c);\n}\n";
    let result = Scanner::new(Grammar::java()).scan(source);
    // array defaults open a brace and are not recognized
    assert_eq!(names(&result), vec!["value", "get"]);
    assert_eq!(result.symbols[0].enclosing_scope_path, vec!["Route"]);
}
