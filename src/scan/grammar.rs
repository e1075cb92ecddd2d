//! Compiled lookup tables for one language family.
//!
//! A `Grammar` is built from a [`LanguageProfile`](crate::profile::LanguageProfile)
//! and is immutable afterwards, so one instance can back any number of
//! concurrent scans.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::profile::{self, LanguageProfile};

/// Compiled grammar tables consumed by the lexer and recognizer.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) name: String,
    pub(crate) keywords: HashSet<String>,
    pub(crate) modifiers: HashSet<String>,
    pub(crate) control_keywords: HashSet<String>,
    pub(crate) type_declaration_keywords: HashSet<String>,
    pub(crate) type_keywords: HashSet<String>,
    pub(crate) trailing_clause_keywords: HashSet<String>,
    pub(crate) constructor_initializers: HashSet<String>,
    pub(crate) default_value_keyword: Option<String>,
    pub(crate) expression_body_arrow: Option<String>,
    pub(crate) anonymous_class_keyword: Option<String>,
    pub(crate) line_comment: Option<String>,
    pub(crate) block_comment: Option<(String, String)>,
    pub(crate) string_delimiters: Vec<char>,
    pub(crate) char_delimiters: Vec<char>,
    pub(crate) verbatim_string_prefixes: Vec<String>,
    pub(crate) emit_type_symbols: bool,
    pub(crate) bodyless_declarations: bool,
    pub(crate) max_candidate_tokens: usize,
}

static JAVA: Lazy<Grammar> = Lazy::new(|| {
    profile::builtin("java")
        .and_then(|p| p.compile())
        .unwrap_or_else(|e| panic!("embedded java profile is invalid: {}", e))
});

impl Grammar {
    /// Build from an already validated profile.
    pub(crate) fn from_profile(profile: &LanguageProfile) -> Self {
        let set = |words: &[String]| words.iter().cloned().collect::<HashSet<_>>();

        let modifiers = set(&profile.modifiers);
        let control_keywords = set(&profile.control_keywords);
        let type_declaration_keywords = set(&profile.type_declaration_keywords);
        let type_keywords = set(&profile.type_keywords);
        let trailing_clause_keywords = set(&profile.trailing_clause_keywords);
        let constructor_initializers = set(&profile.constructor_initializers);

        let mut keywords = set(&profile.keywords);
        keywords.extend(modifiers.iter().cloned());
        keywords.extend(control_keywords.iter().cloned());
        keywords.extend(type_declaration_keywords.iter().cloned());
        keywords.extend(type_keywords.iter().cloned());
        keywords.extend(trailing_clause_keywords.iter().cloned());
        keywords.extend(constructor_initializers.iter().cloned());
        keywords.extend(profile.anonymous_class_keyword.iter().cloned());
        keywords.extend(profile.default_value_keyword.iter().cloned());

        // longest first so `$@` wins over `@`
        let mut verbatim_string_prefixes = profile.verbatim_string_prefixes.clone();
        verbatim_string_prefixes.sort_by(|a, b| b.len().cmp(&a.len()));

        let block_comment = match (&profile.comments.block_start, &profile.comments.block_end) {
            (Some(start), Some(end)) => Some((start.clone(), end.clone())),
            _ => None,
        };

        Self {
            name: profile.name.clone(),
            keywords,
            modifiers,
            control_keywords,
            type_declaration_keywords,
            type_keywords,
            trailing_clause_keywords,
            constructor_initializers,
            default_value_keyword: profile.default_value_keyword.clone(),
            expression_body_arrow: profile.expression_body_arrow.clone(),
            anonymous_class_keyword: profile.anonymous_class_keyword.clone(),
            line_comment: profile.comments.line.clone(),
            block_comment,
            string_delimiters: profile.string_delimiters.clone(),
            char_delimiters: profile.char_delimiters.clone(),
            verbatim_string_prefixes,
            emit_type_symbols: profile.emit_type_symbols,
            bodyless_declarations: profile.bodyless_declarations,
            max_candidate_tokens: profile.max_candidate_tokens,
        }
    }

    /// The grammar of the built-in Java profile.
    pub fn java() -> &'static Grammar {
        &JAVA
    }

    /// Profile name this grammar was compiled from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn is_modifier(&self, word: &str) -> bool {
        self.modifiers.contains(word)
    }

    pub fn is_control_keyword(&self, word: &str) -> bool {
        self.control_keywords.contains(word)
    }

    pub fn is_type_declaration_keyword(&self, word: &str) -> bool {
        self.type_declaration_keywords.contains(word)
    }

    /// Keywords that may appear inside a type expression (`void`, `int`).
    pub fn is_type_keyword(&self, word: &str) -> bool {
        self.type_keywords.contains(word)
    }

    pub fn is_trailing_clause_keyword(&self, word: &str) -> bool {
        self.trailing_clause_keywords.contains(word)
    }

    /// `base`/`this` after a constructor's `:`.
    pub fn is_constructor_initializer(&self, word: &str) -> bool {
        self.constructor_initializers.contains(word)
    }

    pub fn is_default_value_keyword(&self, word: &str) -> bool {
        self.default_value_keyword.as_deref() == Some(word)
    }

    pub fn expression_body_arrow(&self) -> Option<&str> {
        self.expression_body_arrow.as_deref()
    }

    pub fn is_anonymous_class_keyword(&self, word: &str) -> bool {
        self.anonymous_class_keyword.as_deref() == Some(word)
    }

    pub fn line_comment(&self) -> Option<&str> {
        self.line_comment.as_deref()
    }

    pub fn block_comment(&self) -> Option<(&str, &str)> {
        self.block_comment
            .as_ref()
            .map(|(start, end)| (start.as_str(), end.as_str()))
    }

    pub fn is_string_delimiter(&self, c: char) -> bool {
        self.string_delimiters.contains(&c)
    }

    pub fn is_char_delimiter(&self, c: char) -> bool {
        self.char_delimiters.contains(&c)
    }

    /// Length of the verbatim string prefix opening `text`, if any. The
    /// prefix must be followed by a string delimiter.
    pub fn verbatim_prefix_len(&self, text: &str) -> Option<usize> {
        self.verbatim_string_prefixes
            .iter()
            .find(|p| {
                text.starts_with(p.as_str())
                    && text[p.len()..]
                        .chars()
                        .next()
                        .map_or(false, |c| self.is_string_delimiter(c))
            })
            .map(|p| p.len())
    }

    /// Whether class-level declarations emit `Type` symbols.
    pub fn emit_type_symbols(&self) -> bool {
        self.emit_type_symbols
    }

    pub fn bodyless_declarations(&self) -> bool {
        self.bodyless_declarations
    }

    pub fn max_candidate_tokens(&self) -> usize {
        self.max_candidate_tokens
    }

    /// Copy of this grammar with type symbol emission switched.
    pub fn with_type_symbols(&self, emit: bool) -> Self {
        let mut grammar = self.clone();
        grammar.emit_type_symbols = emit;
        grammar
    }
}
