//! Language profiles.
//!
//! A profile is a YAML document naming the words and delimiters the scanner
//! needs for one language family. Built-in profiles are embedded in the
//! binary; users can add or override profiles by dropping YAML files into
//! `<config dir>/bracetag/profiles/`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use phf::phf_map;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scan::Grammar;

/// Built-in profiles by name.
static BUILTIN_PROFILES: phf::Map<&'static str, &'static str> = phf_map! {
    "java" => include_str!("profiles/java.yaml"),
    "csharp" => include_str!("profiles/csharp.yaml"),
};

/// Errors loading or validating a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid profile: {0}")]
    Invalid(String),
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}

/// Comment markers. Either marker kind may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentStyles {
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub block_start: Option<String>,
    #[serde(default)]
    pub block_end: Option<String>,
}

impl Default for CommentStyles {
    fn default() -> Self {
        Self {
            line: Some("//".to_string()),
            block_start: Some("/*".to_string()),
            block_end: Some("*/".to_string()),
        }
    }
}

/// Language profile as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguageProfile {
    pub name: String,
    /// File extensions without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Reserved words with no structural role.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub control_keywords: Vec<String>,
    /// `class`, `interface`, `enum`, ...
    #[serde(default)]
    pub type_declaration_keywords: Vec<String>,
    /// Keywords legal inside a type expression (`void`, primitives).
    #[serde(default)]
    pub type_keywords: Vec<String>,
    /// Clauses allowed after a parameter list (`throws`).
    #[serde(default)]
    pub trailing_clause_keywords: Vec<String>,
    /// Keywords allowed after `:` to chain a constructor (`base`, `this`).
    #[serde(default)]
    pub constructor_initializers: Vec<String>,
    /// Introduces a default value on a bodyless element (`default "x";`).
    #[serde(default)]
    pub default_value_keyword: Option<String>,
    /// Punctuation introducing an expression body ending at `;` (`=>`).
    #[serde(default)]
    pub expression_body_arrow: Option<String>,
    #[serde(default)]
    pub anonymous_class_keyword: Option<String>,
    #[serde(default)]
    pub comments: CommentStyles,
    #[serde(default = "default_string_delimiters")]
    pub string_delimiters: Vec<char>,
    #[serde(default = "default_char_delimiters")]
    pub char_delimiters: Vec<char>,
    /// Prefixes that turn a string into a raw multi-line literal where a
    /// doubled delimiter is the only escape (`@"..."`).
    #[serde(default)]
    pub verbatim_string_prefixes: Vec<String>,
    /// Emit `Type` symbols for class-level declarations (default: false).
    #[serde(default)]
    pub emit_type_symbols: bool,
    /// Recognize `type name(params);` directly inside a type body (default: true).
    #[serde(default = "default_true")]
    pub bodyless_declarations: bool,
    /// Candidates longer than this are never declarations (default: 256).
    #[serde(default = "default_max_candidate_tokens")]
    pub max_candidate_tokens: usize,
}

fn default_string_delimiters() -> Vec<char> {
    vec!['"']
}

fn default_char_delimiters() -> Vec<char> {
    vec!['\'']
}

fn default_true() -> bool {
    true
}

fn default_max_candidate_tokens() -> usize {
    256
}

impl LanguageProfile {
    /// Parse and validate a profile from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a profile from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ProfileError> {
        let profile: LanguageProfile = serde_yaml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_yaml(&self) -> Result<String, ProfileError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::Invalid("profile name is empty".to_string()));
        }

        let c = &self.comments;
        match (&c.block_start, &c.block_end) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ProfileError::Invalid(format!(
                    "{}: block comments need both block_start and block_end",
                    self.name
                )));
            }
            _ => {}
        }
        for marker in [&c.line, &c.block_start, &c.block_end].into_iter().flatten() {
            if marker.is_empty() {
                return Err(ProfileError::Invalid(format!(
                    "{}: comment markers must not be empty",
                    self.name
                )));
            }
        }

        if let Some(c) = self
            .string_delimiters
            .iter()
            .find(|c| self.char_delimiters.contains(c))
        {
            return Err(ProfileError::Invalid(format!(
                "{}: '{}' is both a string and a char delimiter",
                self.name, c
            )));
        }

        if self.verbatim_string_prefixes.iter().any(|p| p.is_empty()) {
            return Err(ProfileError::Invalid(format!(
                "{}: verbatim string prefixes must not be empty",
                self.name
            )));
        }

        if let Some(arrow) = &self.expression_body_arrow {
            if arrow.is_empty() || arrow.chars().any(|c| c.is_alphanumeric() || c.is_whitespace()) {
                return Err(ProfileError::Invalid(format!(
                    "{}: expression_body_arrow must be punctuation",
                    self.name
                )));
            }
        }

        if self.max_candidate_tokens == 0 {
            return Err(ProfileError::Invalid(format!(
                "{}: max_candidate_tokens must be at least 1",
                self.name
            )));
        }

        Ok(())
    }

    /// Validate and build the lookup tables used by the scanner.
    pub fn compile(&self) -> Result<Grammar, ProfileError> {
        self.validate()?;
        Ok(Grammar::from_profile(self))
    }

    /// Whether this profile claims the extension (with or without the dot).
    pub fn handles_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Load a built-in profile by name.
pub fn builtin(name: &str) -> Result<LanguageProfile, ProfileError> {
    let content = BUILTIN_PROFILES
        .get(name)
        .ok_or_else(|| ProfileError::UnknownLanguage(name.to_string()))?;
    LanguageProfile::from_yaml_str(content)
}

/// Names of the embedded profiles.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTIN_PROFILES.keys().copied().collect();
    names.sort_unstable();
    names
}

/// A registered profile together with its compiled grammar.
#[derive(Debug)]
pub struct Language {
    pub profile: LanguageProfile,
    pub grammar: Grammar,
}

impl Language {
    pub fn name(&self) -> &str {
        &self.profile.name
    }
}

lazy_static::lazy_static! {
    /// Registered languages by name.
    static ref REGISTRY: RwLock<HashMap<String, Arc<Language>>> = RwLock::new(HashMap::new());
}

/// Register a profile, replacing any earlier one with the same name.
pub fn register(profile: LanguageProfile) -> Result<Arc<Language>, ProfileError> {
    let grammar = profile.compile()?;
    let language = Arc::new(Language { profile, grammar });
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.insert(language.name().to_string(), Arc::clone(&language));
    Ok(language)
}

/// Look up a registered language by profile name.
pub fn by_name(name: &str) -> Option<Arc<Language>> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.get(name).cloned()
}

/// Look up a registered language by file extension.
/// When several profiles claim the extension, the first by name wins.
pub fn for_extension(ext: &str) -> Option<Arc<Language>> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    let mut matches: Vec<&Arc<Language>> = registry
        .values()
        .filter(|l| l.profile.handles_extension(ext))
        .collect();
    matches.sort_by(|a, b| a.name().cmp(b.name()));
    matches.first().map(|l| Arc::clone(l))
}

/// Sorted names of all registered languages.
pub fn names() -> Vec<String> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    let mut names: Vec<String> = registry.keys().cloned().collect();
    names.sort();
    names
}

/// Per-user profile directory, if the platform has one.
pub fn user_profile_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "bracetag").map(|d| d.config_dir().join("profiles"))
}

/// Register every `*.yaml`/`*.yml` profile in `dir`. Files that fail to
/// load are logged and skipped. Returns the number registered.
pub fn load_dir(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    let mut loaded = 0;
    for path in paths {
        match LanguageProfile::parse_file(&path).and_then(register) {
            Ok(language) => {
                tracing::debug!(name = language.name(), path = %path.display(), "registered profile");
                loaded += 1;
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping profile"),
        }
    }
    loaded
}

/// Register the built-in profiles, then any user profiles.
///
/// Call this once at startup.
pub fn init() {
    for name in builtin_names() {
        match builtin(name).and_then(register) {
            Ok(_) => {}
            Err(e) => tracing::warn!(name, error = %e, "built-in profile rejected"),
        }
    }
    if let Some(dir) = user_profile_dir() {
        load_dir(&dir);
    }
}
