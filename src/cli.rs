//! Command-line interface for bracetag.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::profile::{self, LanguageProfile};
use crate::report;
use crate::runner::{self, Runner};
use crate::scan::DiagnosticKind;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const FORMATS: &[&str] = &["pretty", "json", "ctags"];

/// Fast declaration tagger for brace-delimited languages.
///
/// Bracetag scans Java-like source in a single pass and lists every method
/// and constructor declaration with its modifiers, parameters, enclosing
/// scope and doc comment. It never builds a syntax tree, so truncated or
/// malformed files still produce results plus diagnostics.
#[derive(Parser)]
#[command(name = "bracetag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan files and list declarations
    #[command(visible_alias = "tag")]
    Scan(ScanArgs),
    /// List or show language profiles
    Profiles(ProfilesArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Output format: pretty, json, or ctags
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Additional language profile (YAML); used for every file unless --language is given
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Scan every file with this profile instead of choosing by extension
    #[arg(short, long)]
    pub language: Option<String>,

    /// Also emit class, interface and enum declarations
    #[arg(long)]
    pub types: bool,

    /// Glob pattern for paths to skip (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Drop diagnostics of this kind, e.g. recognition_ambiguity (repeatable)
    #[arg(long, value_name = "KIND")]
    pub ignore: Vec<String>,

    /// Exit non-zero when any warning diagnostic is reported
    #[arg(long)]
    pub strict: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,
}

/// Arguments for the profiles command.
#[derive(Parser)]
pub struct ProfilesArgs {
    /// Print the named profile as YAML
    #[arg(short, long)]
    pub show: Option<String>,
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    profile::init();

    if !FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'ctags'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut ignored = Vec::new();
    for name in &args.ignore {
        match DiagnosticKind::parse(name) {
            Some(kind) => ignored.push(kind),
            None => {
                eprintln!("Error: unknown diagnostic kind {:?}", name);
                return Ok(EXIT_ERROR);
            }
        }
    }

    // Extra profile from the command line
    let mut language = args.language.clone();
    if let Some(path) = &args.profile {
        let extra = match LanguageProfile::parse_file(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error loading profile: {}", e);
                return Ok(EXIT_ERROR);
            }
        };
        let registered = profile::register(extra)?;
        if language.is_none() {
            language = Some(registered.name().to_string());
        }
    }

    if let Some(name) = &language {
        if profile::by_name(name).is_none() {
            eprintln!("Error: unknown language {:?}", name);
            eprintln!("Run 'bracetag profiles' to see available languages");
            return Ok(EXIT_ERROR);
        }
    }

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let (base_dir, files) = if abs_path.is_dir() {
        (abs_path.clone(), runner::collect_files(&abs_path)?)
    } else {
        let parent = abs_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| abs_path.clone());
        (parent, vec![abs_path.clone()])
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let mut runner = Runner::new(&base_dir)
        .exclude(args.exclude.as_slice())?
        .emit_type_symbols(args.types);
    if let Some(name) = language {
        runner = runner.language(name);
    }

    let progress = if args.progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} files")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let mut scans = runner.run(&files, progress.as_ref())?;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    if !ignored.is_empty() {
        for scan in &mut scans {
            scan.result.diagnostics.retain(|d| !ignored.contains(&d.kind));
        }
    }

    // Output results
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&mut out, &scans)?,
        "ctags" => report::write_ctags(&mut out, &scans)?,
        _ => report::write_pretty(&mut out, &path_str, &scans)?,
    }
    out.flush()?;

    // Return appropriate exit code
    let warned = scans.iter().any(|s| s.result.has_warnings());
    if args.strict && warned {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the profiles command.
pub fn run_profiles(args: &ProfilesArgs) -> anyhow::Result<i32> {
    profile::init();

    if let Some(name) = &args.show {
        return match profile::by_name(name) {
            Some(language) => {
                print!("{}", language.profile.to_yaml()?);
                Ok(EXIT_SUCCESS)
            }
            None => {
                eprintln!("Error: unknown language {:?}", name);
                Ok(EXIT_ERROR)
            }
        };
    }

    let builtins = profile::builtin_names();
    println!("Available profiles:");
    println!();
    for name in profile::names() {
        let Some(language) = profile::by_name(&name) else {
            continue;
        };
        let exts: Vec<String> = language
            .profile
            .extensions
            .iter()
            .map(|e| format!(".{}", e))
            .collect();
        let origin = if builtins.contains(&name.as_str()) {
            "built-in"
        } else {
            "user"
        };
        println!("  {:<16} {:<10} {}", name, origin, exts.join(" "));
    }

    if let Some(dir) = profile::user_profile_dir() {
        println!();
        println!("User profiles are loaded from {}", dir.display());
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scan_args(path: PathBuf) -> ScanArgs {
        ScanArgs {
            path,
            format: "json".to_string(),
            profile: None,
            language: None,
            types: false,
            exclude: vec![],
            ignore: vec![],
            output: None,
            strict: false,
            progress: false,
        }
    }

    #[test]
    fn test_cli_parses_scan_flags() {
        let cli = Cli::try_parse_from([
            "bracetag", "-v", "scan", "src", "-f", "ctags", "-e", "gen/**", "-e", "*.g.java",
            "--types", "--strict",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.format, "ctags");
                assert_eq!(args.exclude, vec!["gen/**", "*.g.java"]);
                assert!(args.types);
                assert!(args.strict);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_invalid_format_is_usage_error() {
        let temp = TempDir::new().unwrap();
        let mut args = scan_args(temp.path().to_path_buf());
        args.format = "xml".to_string();
        assert_eq!(run_scan(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_missing_path_is_error() {
        let args = scan_args(PathBuf::from("/no/such/dir/anywhere"));
        assert_eq!(run_scan(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_strict_exit_code_and_output_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("A.java"), "class A { void f() {").unwrap();
        let out = temp.path().join("out.json");

        let mut args = scan_args(temp.path().to_path_buf());
        args.output = Some(out.clone());
        assert_eq!(run_scan(&args).unwrap(), EXIT_SUCCESS);
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("\"unbalanced_braces\""), "{}", written);

        args.strict = true;
        assert_eq!(run_scan(&args).unwrap(), EXIT_FAILED);

        args.ignore = vec!["unbalanced_braces".to_string()];
        assert_eq!(run_scan(&args).unwrap(), EXIT_SUCCESS);
        let written = fs::read_to_string(&out).unwrap();
        assert!(!written.contains("\"unbalanced_braces\""), "{}", written);
    }

    #[test]
    fn test_unknown_ignore_kind_is_usage_error() {
        let temp = TempDir::new().unwrap();
        let mut args = scan_args(temp.path().to_path_buf());
        args.ignore = vec!["typo".to_string()];
        assert_eq!(run_scan(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_csharp_verbatim_string_keeps_strict_exit_clean() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("D.cs"),
            "class D {\n  string p = @\"C:\\dir\\\";\n  public void H() { }\n}\n",
        )
        .unwrap();
        let out = temp.path().join("out.json");

        let mut args = scan_args(temp.path().to_path_buf());
        args.output = Some(out.clone());
        args.strict = true;
        assert_eq!(run_scan(&args).unwrap(), EXIT_SUCCESS);
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("\"name\": \"H\""), "{}", written);
    }
}
