//! Output formatting for scan results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - ctags: tags file understood by editors (Exuberant/Universal ctags format)

use std::io::Write;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::runner::FileScan;
use crate::scan::{Diagnostic, DiagnosticKind, ScopeStats, Severity, Symbol, SymbolKind};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub files: Vec<JsonFile>,
    pub symbol_count: usize,
    pub diagnostic_count: usize,
}

/// Per-file JSON entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    pub language: String,
    pub symbols: Vec<Symbol>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ScopeStats,
}

impl JsonReport {
    pub fn from_scans(scans: &[FileScan]) -> Self {
        let files: Vec<JsonFile> = scans
            .iter()
            .map(|scan| JsonFile {
                path: display_path(scan),
                language: scan.language.clone(),
                symbols: scan.result.symbols.clone(),
                diagnostics: scan.result.diagnostics.clone(),
                stats: scan.result.stats,
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            symbol_count: files.iter().map(|f| f.symbols.len()).sum(),
            diagnostic_count: files.iter().map(|f| f.diagnostics.len()).sum(),
            files,
        }
    }
}

/// Write results in JSON format.
pub fn write_json<W: Write>(out: &mut W, scans: &[FileScan]) -> anyhow::Result<()> {
    let report = JsonReport::from_scans(scans);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// ctags Format
// =============================================================================

/// Write a sorted tags file.
pub fn write_ctags<W: Write>(out: &mut W, scans: &[FileScan]) -> anyhow::Result<()> {
    writeln!(
        out,
        "!_TAG_FILE_FORMAT\t2\t/extended format; --format=1 will not append ;\" to lines/"
    )?;
    writeln!(out, "!_TAG_FILE_SORTED\t1\t/0=unsorted, 1=sorted, 2=foldcase/")?;
    writeln!(out, "!_TAG_PROGRAM_NAME\tbracetag\t//")?;
    writeln!(out, "!_TAG_PROGRAM_VERSION\t{}\t//", env!("CARGO_PKG_VERSION"))?;

    let mut entries: Vec<(&str, String, &Symbol)> = scans
        .iter()
        .flat_map(|scan| {
            let file = display_path(scan);
            scan.result
                .symbols
                .iter()
                .map(move |symbol| (symbol.name.as_str(), file.clone(), symbol))
        })
        .collect();
    entries.sort_by(|a, b| {
        a.0.cmp(b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.span.line.cmp(&b.2.span.line))
    });

    for (name, file, symbol) in entries {
        write!(
            out,
            "{}\t{}\t{};\"\t{}",
            name,
            file,
            symbol.span.line,
            ctags_kind(symbol.kind)
        )?;
        if !symbol.enclosing_scope_path.is_empty() {
            write!(out, "\tclass:{}", symbol.enclosing_scope_path.join("."))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn ctags_kind(kind: SymbolKind) -> char {
    match kind {
        SymbolKind::Method | SymbolKind::Constructor => 'm',
        SymbolKind::Type => 'c',
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty<W: Write>(out: &mut W, path: &str, scans: &[FileScan]) -> anyhow::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "bracetag".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Scanning: ".dimmed(), path)?;
    writeln!(out)?;

    for scan in scans {
        write_file(out, scan)?;
    }

    write_summary(out, scans)?;
    writeln!(out)?;
    Ok(())
}

fn write_file<W: Write>(out: &mut W, scan: &FileScan) -> anyhow::Result<()> {
    writeln!(
        out,
        "  {} {}",
        display_path(scan).blue(),
        format!("({})", scan.language).dimmed()
    )?;

    for symbol in &scan.result.symbols {
        write_symbol(out, symbol)?;
    }
    for diagnostic in &scan.result.diagnostics {
        write_diagnostic(out, diagnostic)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_symbol<W: Write>(out: &mut W, symbol: &Symbol) -> anyhow::Result<()> {
    write!(
        out,
        "    {:<8} {:<12} {}",
        symbol.span.to_string().dimmed(),
        symbol.kind.as_str(),
        symbol.signature().bold()
    )?;
    if !symbol.enclosing_scope_path.is_empty() {
        write!(
            out,
            "  {}",
            format!("in {}", symbol.enclosing_scope_path.join(".")).dimmed()
        )?;
    }
    writeln!(out)?;

    if let Some(summary) = symbol.doc_summary() {
        writeln!(out, "             {}", summary.dimmed())?;
    }
    Ok(())
}

fn write_diagnostic<W: Write>(out: &mut W, diagnostic: &Diagnostic) -> anyhow::Result<()> {
    let tag = match diagnostic.severity {
        Severity::Warning => "WARN ".yellow(),
        Severity::Info => "INFO ".blue(),
    };
    writeln!(
        out,
        "    {} {:<8} {:<22} {}",
        tag,
        format!("{}", diagnostic.line).dimmed(),
        diagnostic.kind.as_str().dimmed(),
        diagnostic.message
    )?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, scans: &[FileScan]) -> anyhow::Result<()> {
    let symbols: usize = scans.iter().map(|s| s.result.symbols.len()).sum();
    let warnings: usize = scans.iter().map(|s| s.result.warning_count()).sum();
    let notes: usize = scans
        .iter()
        .map(|s| s.result.diagnostics_of(DiagnosticKind::RecognitionAmbiguity).count())
        .sum();

    write!(
        out,
        "  {} {} in {} {}",
        symbols.to_string().bold(),
        plural(symbols, "symbol"),
        scans.len(),
        plural(scans.len(), "file")
    )?;
    if warnings > 0 {
        write!(
            out,
            "  {}",
            format!("{} {}", warnings, plural(warnings, "warning")).yellow()
        )?;
    }
    if notes > 0 {
        write!(
            out,
            "  {}",
            format!("{} {}", notes, plural(notes, "note")).dimmed()
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Forward-slash path for output, stable across platforms.
fn display_path(scan: &FileScan) -> String {
    scan.path.to_string_lossy().replace('\\', "/")
}
