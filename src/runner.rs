//! Multi-file runner.
//!
//! Each file gets its own independent scan pipeline, so files are scanned in
//! parallel with rayon and the results are merged in path order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::profile::{self, Language};
use crate::scan::{Grammar, ScanResult, Scanner};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "vendor", "node_modules", "build"];

/// Scan result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileScan {
    /// Path relative to the runner's base directory.
    pub path: PathBuf,
    /// Profile name used for the scan.
    pub language: String,
    pub result: ScanResult,
}

/// Scans a set of files with the registered language profiles.
pub struct Runner {
    base_dir: PathBuf,
    excludes: Option<GlobSet>,
    language: Option<String>,
    emit_type_symbols: bool,
}

impl Runner {
    /// Create a new runner. Paths in results are reported relative to `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            excludes: None,
            language: None,
            emit_type_symbols: false,
        }
    }

    /// Skip files whose relative path matches any of the glob patterns.
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> anyhow::Result<Self> {
        if patterns.is_empty() {
            return Ok(self);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        self.excludes = Some(builder.build()?);
        Ok(self)
    }

    /// Scan every file with the named profile instead of choosing by extension.
    pub fn language(mut self, name: impl Into<String>) -> Self {
        self.language = Some(name.into());
        self
    }

    /// Emit `Type` symbols regardless of the profile setting.
    pub fn emit_type_symbols(mut self, emit: bool) -> Self {
        self.emit_type_symbols = emit;
        self
    }

    /// Scan `files`. Files without a profile, excluded files and files that
    /// cannot be read as UTF-8 are skipped.
    pub fn run(
        &self,
        files: &[PathBuf],
        progress: Option<&ProgressBar>,
    ) -> anyhow::Result<Vec<FileScan>> {
        let forced = match &self.language {
            Some(name) => Some(
                profile::by_name(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown language: {}", name))?,
            ),
            None => None,
        };

        // Grammars with type symbols switched on, one per language.
        let overrides: HashMap<String, Grammar> = if self.emit_type_symbols {
            let names = match &forced {
                Some(language) => vec![language.name().to_string()],
                None => profile::names(),
            };
            names
                .into_iter()
                .filter_map(|name| {
                    let grammar = profile::by_name(&name)?.grammar.with_type_symbols(true);
                    Some((name, grammar))
                })
                .collect()
        } else {
            HashMap::new()
        };

        let mut scans: Vec<FileScan> = files
            .par_iter()
            .filter_map(|path| {
                let scan = self.scan_file(path, forced.as_ref(), &overrides);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                scan
            })
            .collect();

        scans.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(scans)
    }

    fn scan_file(
        &self,
        path: &Path,
        forced: Option<&Arc<Language>>,
        overrides: &HashMap<String, Grammar>,
    ) -> Option<FileScan> {
        let rel = self.relative(path);
        if self.is_excluded(&rel) {
            tracing::debug!(path = %rel.display(), "excluded");
            return None;
        }

        let language = match forced {
            Some(language) => Arc::clone(language),
            None => {
                let ext = path.extension().and_then(|e| e.to_str())?;
                profile::for_extension(ext)?
            }
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                return None;
            }
        };

        let grammar = overrides.get(language.name()).unwrap_or(&language.grammar);
        let result = match Scanner::new(grammar).scan_bytes(&bytes) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                return None;
            }
        };

        tracing::debug!(
            path = %rel.display(),
            symbols = result.symbols.len(),
            diagnostics = result.diagnostics.len(),
            "scanned"
        );

        Some(FileScan {
            path: rel,
            language: language.name().to_string(),
            result,
        })
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.base_dir)
            .unwrap_or(path)
            .to_path_buf()
    }

    fn is_excluded(&self, rel: &Path) -> bool {
        self.excludes
            .as_ref()
            .map_or(false, |set| set.is_match(rel))
    }
}

/// Collect files under `root` that some registered profile can scan.
/// Hidden directories and build/dependency directories are skipped.
pub fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&&*name)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if profile::for_extension(ext).is_some() {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_files_skips_hidden_and_build_dirs() {
        profile::init();
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/A.java", "class A {}");
        write(temp.path(), "src/B.cs", "class B {}");
        write(temp.path(), "src/notes.txt", "class C {}");
        write(temp.path(), ".git/D.java", "class D {}");
        write(temp.path(), "target/E.java", "class E {}");
        write(temp.path(), "node_modules/F.java", "class F {}");

        let files = collect_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("src/A.java"), PathBuf::from("src/B.cs")]
        );
    }

    #[test]
    fn test_run_sorted_relative_paths() {
        profile::init();
        let temp = TempDir::new().unwrap();
        let b = write(temp.path(), "b/B.java", "class B { void g() {} }");
        let a = write(temp.path(), "a/A.java", "class A { void f() {} }");

        let scans = Runner::new(temp.path()).run(&[b, a], None).unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].path, PathBuf::from("a/A.java"));
        assert_eq!(scans[0].language, "java");
        assert_eq!(scans[0].result.symbols[0].name, "f");
        assert_eq!(scans[1].result.symbols[0].name, "g");
    }

    #[test]
    fn test_run_skips_excluded_unknown_and_invalid() {
        profile::init();
        let temp = TempDir::new().unwrap();
        let kept = write(temp.path(), "src/A.java", "class A { void f() {} }");
        let excluded = write(temp.path(), "gen/G.java", "class G { void g() {} }");
        let unknown = write(temp.path(), "README.md", "# readme");
        let binary = temp.path().join("src/Bad.java");
        fs::write(&binary, b"class Bad {\xff\xfe}").unwrap();

        let runner = Runner::new(temp.path()).exclude(&["gen/**"]).unwrap();
        let scans = runner
            .run(&[kept, excluded, unknown, binary], None)
            .unwrap();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].path, PathBuf::from("src/A.java"));
    }

    #[test]
    fn test_forced_language_and_type_symbols() {
        profile::init();
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "Shape.txt", "class Shape { int sides() { return 0; } }");

        let scans = Runner::new(temp.path())
            .language("java")
            .emit_type_symbols(true)
            .run(&[file], None)
            .unwrap();
        let names: Vec<_> = scans[0]
            .result
            .symbols
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Shape", "sides"]);

        let err = Runner::new(temp.path()).language("klingon").run(&[], None);
        assert!(err.is_err());
    }

    #[test]
    fn test_progress_counts_every_file() {
        profile::init();
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "A.java", "class A {}");
        let b = write(temp.path(), "B.unknown", "");

        let pb = ProgressBar::hidden();
        Runner::new(temp.path()).run(&[a, b], Some(&pb)).unwrap();
        assert_eq!(pb.position(), 2);
    }
}
