//! Declaration recognizer.
//!
//! Buffers the significant tokens since the last `;`, `{` or `}` and, when a
//! `{` is about to open a scope, decides what opened it:
//!
//! ```text
//! [annotations|modifiers]* [<T>] type name[<T>] ( params ) [throws|where ...] {   -> Declaration
//! [modifiers]* Name ( params ) [: base|this ( args )] {  (Name == enclosing type) -> Declaration
//! [modifiers]* class|interface|enum Name ... {                          -> Type
//! ... new a.b.Name<T> ( args ) {                                        -> AnonymousClass
//! if|for|while|catch|switch|synchronized|try|else|do ... {              -> ControlBlock
//! ```
//!
//! Everything else opens an `Unknown` scope. At a `;` directly inside a type
//! body the same shapes are tried once more, for bodyless members, members
//! with a `default` value and `=> expr;` bodies. A call statement never sits
//! directly in a type body, so it is not mistaken for one.

use super::grammar::Grammar;
use super::scope::ScopeTracker;
use super::symbol::{Span, Symbol, SymbolKind};
use super::token::{Token, TokenKind};

/// Recognizer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerState {
    /// At a statement or scope boundary with nothing buffered.
    Idle,
    /// Buffering modifier/type/name tokens.
    AccumulatingCandidate,
    /// Inside one or more open parentheses.
    AwaitingParenClose,
}

/// A declaration-shaped candidate that was declined in favour of the call
/// interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub name: String,
    pub line: usize,
    pub reason: String,
}

/// Outcome of evaluating the buffered candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Declaration(Symbol),
    Type {
        name: String,
        symbol: Option<Symbol>,
    },
    AnonymousClass,
    ControlBlock,
    Unknown,
    Ambiguous(Ambiguity),
}

/// Tokens since the last boundary.
#[derive(Debug, Clone, Default)]
struct Candidate<'src> {
    tokens: Vec<Token<'src>>,
    paren_depth: usize,
    doc: Option<&'src str>,
    overflowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberTail {
    DefaultValue,
    ExpressionBody,
}

/// A candidate interrupted by a `{` inside parentheses, restored when the
/// scope opened at `depth` closes.
#[derive(Debug)]
struct Suspended<'src> {
    depth: usize,
    candidate: Candidate<'src>,
}

pub struct Recognizer<'src, 'g> {
    source: &'src str,
    grammar: &'g Grammar,
    state: RecognizerState,
    candidate: Candidate<'src>,
    pending_doc: Option<&'src str>,
    suspended: Vec<Suspended<'src>>,
}

impl<'src, 'g> Recognizer<'src, 'g> {
    pub fn new(source: &'src str, grammar: &'g Grammar) -> Self {
        Self {
            source,
            grammar,
            state: RecognizerState::Idle,
            candidate: Candidate::default(),
            pending_doc: None,
            suspended: Vec::new(),
        }
    }

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    /// Whether end of input arrived inside an open parenthesis.
    pub fn in_paren_group(&self) -> bool {
        self.candidate.paren_depth > 0
    }

    /// Feed any token other than `{`, `}` and `;`.
    pub fn observe(&mut self, token: Token<'src>) {
        match token.kind {
            TokenKind::Whitespace
            | TokenKind::Newline
            | TokenKind::LineComment
            | TokenKind::Eof => return,
            TokenKind::BlockComment => {
                if self.candidate.tokens.is_empty() {
                    self.pending_doc = Some(token.text);
                }
                return;
            }
            _ => {}
        }

        if self.candidate.tokens.is_empty() {
            self.candidate.doc = self.pending_doc.take();
        }

        if token.is_punct('(') {
            self.candidate.paren_depth += 1;
        } else if token.is_punct(')') {
            self.candidate.paren_depth = self.candidate.paren_depth.saturating_sub(1);
        }

        if self.candidate.tokens.len() < self.grammar.max_candidate_tokens() {
            self.candidate.tokens.push(token);
        } else {
            self.candidate.overflowed = true;
        }
        self.sync_state();
    }

    /// Decide what the `{` about to be pushed opens. Call before the push.
    pub fn on_open_brace(&mut self, tracker: &ScopeTracker) -> Decision {
        let decision = self.classify(tracker);

        let candidate = std::mem::take(&mut self.candidate);
        if candidate.paren_depth > 0 {
            self.suspended.push(Suspended {
                depth: tracker.depth(),
                candidate,
            });
        }
        self.pending_doc = None;
        self.sync_state();
        decision
    }

    /// A `}` closed the scope at `closed_depth` (`None` for a stray brace).
    pub fn on_close_brace(&mut self, closed_depth: Option<usize>) {
        self.candidate = Candidate::default();
        self.pending_doc = None;

        if let Some(depth) = closed_depth {
            while self.suspended.last().map_or(false, |s| s.depth > depth) {
                self.suspended.pop();
            }
            if self.suspended.last().map_or(false, |s| s.depth == depth) {
                if let Some(resumed) = self.suspended.pop() {
                    self.candidate = resumed.candidate;
                }
            }
        }
        self.sync_state();
    }

    /// Handle `;`. Returns a decision only for bodyless declarations
    /// directly inside a type body.
    pub fn on_semicolon(&mut self, token: Token<'src>, tracker: &ScopeTracker) -> Option<Decision> {
        if self.candidate.paren_depth > 0 {
            // `for (a; b; c)` header
            self.observe(token);
            return None;
        }

        let evaluate = self.grammar.bodyless_declarations()
            && tracker.directly_in_type()
            && !self.candidate.overflowed
            && !self.candidate.tokens.is_empty();

        let decision = if evaluate {
            let run = &self.candidate.tokens;
            // `=> expr;` is a body, `default value;` is not
            let (end, with_body) = match self.member_tail_start(run) {
                Some((i, MemberTail::ExpressionBody)) => (i, true),
                Some((i, MemberTail::DefaultValue)) => (i, false),
                None => (run.len(), false),
            };
            match self.match_callable(&run[..end], tracker, with_body) {
                d @ (Decision::Declaration(_) | Decision::Ambiguous(_)) => Some(d),
                _ => None,
            }
        } else {
            None
        };

        self.candidate = Candidate::default();
        self.pending_doc = None;
        self.sync_state();
        decision
    }

    fn sync_state(&mut self) {
        self.state = if self.candidate.tokens.is_empty() && !self.candidate.overflowed {
            RecognizerState::Idle
        } else if self.candidate.paren_depth > 0 {
            RecognizerState::AwaitingParenClose
        } else {
            RecognizerState::AccumulatingCandidate
        };
    }

    fn classify(&self, tracker: &ScopeTracker) -> Decision {
        let run = &self.candidate.tokens;
        if self.candidate.overflowed || run.is_empty() {
            return Decision::Unknown;
        }
        if is_anonymous_class(self.grammar, run) {
            return Decision::AnonymousClass;
        }
        if self.candidate.paren_depth > 0 {
            // lambda bodies and array initializers inside an argument list
            return Decision::Unknown;
        }
        if starts_with_control(self.grammar, run) {
            return Decision::ControlBlock;
        }
        if let Some(decision) = self.match_type(run, tracker) {
            return decision;
        }
        self.match_callable(run, tracker, true)
    }

    fn match_type(&self, run: &[Token<'src>], tracker: &ScopeTracker) -> Option<Decision> {
        let (modifiers, mut i) = strip_prefix(self.grammar, run);
        // `@interface`
        if run.get(i).map_or(false, |t| t.is_punct('@')) {
            i += 1;
        }
        let keyword = run.get(i)?;
        if keyword.kind != TokenKind::Keyword || !self.grammar.is_type_declaration_keyword(keyword.text)
        {
            return None;
        }
        let name = run.get(i + 1).filter(|t| t.is_identifier())?;

        let symbol = if self.grammar.emit_type_symbols() {
            // record components: `record Point(int x, int y)`
            let mut after = i + 2;
            if run.get(after).map_or(false, |t| t.is_punct('<')) {
                after = skip_angle_forward(run, after).unwrap_or(run.len());
            }
            let parameter_list_text = match run.get(after).filter(|t| t.is_punct('(')) {
                Some(open) => match matching_close(run, after) {
                    Some(close) => self.source[open.end..run[close].start].to_string(),
                    None => String::new(),
                },
                None => String::new(),
            };

            Some(Symbol {
                name: name.text.to_string(),
                kind: SymbolKind::Type,
                modifiers,
                parameter_list_text,
                start_line: run[0].line,
                span: Span::from_token(name),
                enclosing_scope_path: tracker.scope_path(),
                doc_comment: self.candidate.doc.map(str::to_string),
            })
        } else {
            None
        };

        Some(Decision::Type {
            name: name.text.to_string(),
            symbol,
        })
    }

    /// Match `[modifiers] [type] name ( params ) [throws ...]` ending the run.
    fn match_callable(
        &self,
        run: &[Token<'src>],
        tracker: &ScopeTracker,
        with_body: bool,
    ) -> Decision {
        let mut end = match self.strip_trailing_clause(run) {
            Some(end) => end,
            None => return Decision::Unknown,
        };
        let chained = match self.constructor_initializer_start(&run[..end]) {
            Some(colon) if with_body => {
                end = colon;
                true
            }
            _ => false,
        };
        if end == 0 || !run[end - 1].is_punct(')') {
            return Decision::Unknown;
        }
        let close = end - 1;
        let open = match matching_open(run, close) {
            Some(open) if open > 0 => open,
            _ => return Decision::Unknown,
        };

        // `Get<T>(`
        let mut name_idx = open - 1;
        if run[name_idx].is_punct('>') {
            name_idx = match skip_angle_back(run, name_idx) {
                Some(lt) if lt > 0 => lt - 1,
                _ => return Decision::Unknown,
            };
        }
        let name = &run[name_idx];
        if !name.is_identifier() {
            return Decision::Unknown;
        }

        let (modifiers, mut type_start) = strip_prefix(self.grammar, &run[..name_idx]);
        if run[type_start].is_punct('<') && type_start < name_idx {
            // generic method type parameters
            match skip_angle_forward(run, type_start) {
                Some(after) if after <= name_idx => type_start = after,
                _ => return Decision::Unknown,
            }
        }
        let type_tokens = &run[type_start..name_idx];

        let kind = if type_tokens.is_empty() {
            match tracker.enclosing_type_name() {
                Some(owner) if with_body && owner == name.text => SymbolKind::Constructor,
                _ => return Decision::Unknown,
            }
        } else {
            let well_formed = type_tokens.iter().all(|t| self.is_type_token(t))
                && type_tokens.last().map_or(false, |t| self.ends_type(t));
            if !well_formed {
                return Decision::Unknown;
            }
            SymbolKind::Method
        };
        if chained && kind != SymbolKind::Constructor {
            return Decision::Unknown;
        }

        if let Some(reason) = self.call_like_arguments(&run[open + 1..close]) {
            return Decision::Ambiguous(Ambiguity {
                name: name.text.to_string(),
                line: name.line,
                reason,
            });
        }

        Decision::Declaration(Symbol {
            name: name.text.to_string(),
            kind,
            modifiers,
            parameter_list_text: self.source[run[open].end..run[close].start].to_string(),
            start_line: run[0].line,
            span: Span::from_token(name),
            enclosing_scope_path: tracker.scope_path(),
            doc_comment: self.candidate.doc.map(str::to_string),
        })
    }

    /// End index of the run once a trailing clause (`throws A, B`,
    /// `where T : class`) is removed. Only keywords after the parameter
    /// list start a clause. `None` when the clause is malformed.
    fn strip_trailing_clause(&self, run: &[Token<'src>]) -> Option<usize> {
        let mut depth = 0usize;
        let mut closed = false;
        let mut clause = None;
        for (i, t) in run.iter().enumerate() {
            if t.is_punct('(') {
                depth += 1;
            } else if t.is_punct(')') {
                depth = depth.saturating_sub(1);
                closed |= depth == 0;
            } else if closed
                && depth == 0
                && t.kind == TokenKind::Keyword
                && self.grammar.is_trailing_clause_keyword(t.text)
            {
                clause = Some(i);
                break;
            }
        }

        let i = match clause {
            None => return Some(run.len()),
            Some(i) => i,
        };
        let tail = &run[i + 1..];
        let valid = !tail.is_empty()
            && tail.iter().all(|t| match t.kind {
                TokenKind::Identifier | TokenKind::Keyword => true,
                TokenKind::Punctuation(c) => {
                    matches!(c, '.' | ',' | '<' | '>' | '?' | ':' | '(' | ')' | '[' | ']')
                }
                _ => false,
            });
        if valid {
            Some(i)
        } else {
            None
        }
    }

    /// Index of the `:` starting a `: base(...)` / `: this(...)` chain that
    /// ends the run.
    fn constructor_initializer_start(&self, run: &[Token<'src>]) -> Option<usize> {
        let close = run.len().checked_sub(1)?;
        if !run[close].is_punct(')') {
            return None;
        }
        let open = matching_open(run, close)?;
        let keyword = run.get(open.checked_sub(1)?)?;
        let colon = open.checked_sub(2)?;
        let chains = keyword.kind == TokenKind::Keyword
            && self.grammar.is_constructor_initializer(keyword.text)
            && run[colon].is_punct(':');
        chains.then_some(colon)
    }

    /// Where a member's tail starts after its parameter list: a `default`
    /// value or an expression body.
    fn member_tail_start(&self, run: &[Token<'src>]) -> Option<(usize, MemberTail)> {
        let mut depth = 0usize;
        let mut closed = false;
        for (i, t) in run.iter().enumerate() {
            if t.is_punct('(') {
                depth += 1;
                continue;
            }
            if t.is_punct(')') {
                depth = depth.saturating_sub(1);
                closed |= depth == 0;
                continue;
            }
            if !closed || depth > 0 {
                continue;
            }
            let tail = if t.kind == TokenKind::Keyword && self.grammar.is_default_value_keyword(t.text) {
                Some((MemberTail::DefaultValue, 1))
            } else {
                self.grammar
                    .expression_body_arrow()
                    .and_then(|arrow| punct_run_len(run, i, arrow))
                    .map(|len| (MemberTail::ExpressionBody, len))
            };
            if let Some((kind, len)) = tail {
                return (i + len < run.len()).then_some((i, kind));
            }
        }
        None
    }

    fn is_type_token(&self, t: &Token<'_>) -> bool {
        match t.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword => self.grammar.is_type_keyword(t.text),
            TokenKind::Punctuation(c) => matches!(c, '<' | '>' | ',' | '.' | '?' | '[' | ']' | '&'),
            _ => false,
        }
    }

    /// Tokens that can end a type expression right before the name.
    fn ends_type(&self, t: &Token<'_>) -> bool {
        match t.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword => self.grammar.is_type_keyword(t.text),
            TokenKind::Punctuation(c) => c == '>' || c == ']',
            _ => false,
        }
    }

    /// Reason the parameter list reads like call arguments, if it does.
    /// Literals after `=` are default values and do not count.
    fn call_like_arguments(&self, params: &[Token<'src>]) -> Option<String> {
        let mut depth = 0usize;
        let mut in_default = false;
        for t in params {
            if t.is_punct('(') {
                depth += 1;
                continue;
            }
            if t.is_punct(')') {
                depth = depth.saturating_sub(1);
                continue;
            }
            if depth > 0 {
                continue;
            }
            if t.is_punct('=') {
                in_default = true;
            } else if t.is_punct(',') {
                in_default = false;
            } else if t.kind.is_literal() && !in_default {
                return Some(format!("argument {} is a literal", t.text));
            } else if t.kind == TokenKind::Keyword && self.grammar.is_anonymous_class_keyword(t.text)
            {
                return Some(format!("argument constructs an object with '{}'", t.text));
            }
        }
        None
    }
}

/// Leading annotations, attribute lists and modifier keywords. Returns the modifiers in
/// source order (deduplicated) and the index of the first other token.
fn strip_prefix(grammar: &Grammar, tokens: &[Token<'_>]) -> (Vec<String>, usize) {
    let mut modifiers: Vec<String> = Vec::new();
    let mut i = 0;

    while let Some(t) = tokens.get(i) {
        if t.is_punct('@') && tokens.get(i + 1).map_or(false, |n| n.is_identifier()) {
            let mut j = i + 2;
            while tokens.get(j).map_or(false, |t| t.is_punct('.'))
                && tokens.get(j + 1).map_or(false, |t| t.is_identifier())
            {
                j += 2;
            }
            if tokens.get(j).map_or(false, |t| t.is_punct('(')) {
                match matching_close(tokens, j) {
                    Some(close) => j = close + 1,
                    None => break,
                }
            }
            i = j;
        } else if i == 0 && t.is_punct('[') {
            // bracketed attribute lists: `[Obsolete] [Test]`
            while tokens.get(i).map_or(false, |t| t.is_punct('[')) {
                match balanced_end(tokens, i, '[', ']') {
                    Some(close) => i = close + 1,
                    None => return (modifiers, 0),
                }
            }
        } else if t.kind == TokenKind::Keyword && grammar.is_modifier(t.text) {
            if !modifiers.iter().any(|m| m == t.text) {
                modifiers.push(t.text.to_string());
            }
            i += 1;
        } else if let Some(word) = hyphenated_modifier(grammar, tokens, i) {
            if !modifiers.contains(&word) {
                modifiers.push(word);
            }
            i += 3;
        } else {
            break;
        }
    }

    (modifiers, i)
}

/// Number of tokens spelling `text` as adjacent punctuation at `i`.
fn punct_run_len(run: &[Token<'_>], i: usize, text: &str) -> Option<usize> {
    let mut prev_end = None;
    for (n, c) in text.chars().enumerate() {
        let t = run.get(i + n)?;
        if !t.is_punct(c) || prev_end.map_or(false, |end| end != t.start) {
            return None;
        }
        prev_end = Some(t.end);
    }
    Some(text.chars().count())
}

/// `non-sealed`: two words joined by `-` with no space between.
fn hyphenated_modifier(grammar: &Grammar, tokens: &[Token<'_>], i: usize) -> Option<String> {
    let (first, dash, second) = (tokens.get(i)?, tokens.get(i + 1)?, tokens.get(i + 2)?);
    let joined = first.is_word()
        && dash.is_punct('-')
        && second.is_word()
        && first.end == dash.start
        && dash.end == second.start;
    if !joined {
        return None;
    }
    let word = format!("{}-{}", first.text, second.text);
    grammar.is_modifier(&word).then_some(word)
}

/// Run opens with a control keyword, optionally after `label:` prefixes.
/// Keywords that double as modifiers (`synchronized`) count only when
/// followed by `(`.
fn starts_with_control(grammar: &Grammar, run: &[Token<'_>]) -> bool {
    let mut i = 0;
    while i + 1 < run.len() && run[i].is_identifier() && run[i + 1].is_punct(':') {
        i += 2;
    }
    let first = match run.get(i) {
        Some(t) if t.kind == TokenKind::Keyword => t,
        _ => return false,
    };
    if !grammar.is_control_keyword(first.text) {
        return false;
    }
    !grammar.is_modifier(first.text) || run.get(i + 1).map_or(false, |t| t.is_punct('('))
}

/// Run ends with `new Qualified.Name<Args>(...)`.
fn is_anonymous_class(grammar: &Grammar, run: &[Token<'_>]) -> bool {
    let last = match run.len().checked_sub(1) {
        Some(last) if run[last].is_punct(')') => last,
        _ => return false,
    };
    let mut i = match matching_open(run, last) {
        Some(open) => open,
        None => return false,
    };

    if i > 0 && run[i - 1].is_punct('>') {
        i = match skip_angle_back(run, i - 1) {
            Some(lt) => lt,
            None => return false,
        };
    }
    if i == 0 || !run[i - 1].is_identifier() {
        return false;
    }
    i -= 1;
    while i >= 2 && run[i - 1].is_punct('.') && run[i - 2].is_identifier() {
        i -= 2;
    }

    i > 0 && run[i - 1].kind == TokenKind::Keyword && grammar.is_anonymous_class_keyword(run[i - 1].text)
}

/// Index of the `(` matching the `)` at `close`.
fn matching_open(run: &[Token<'_>], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        if run[i].is_punct(')') {
            depth += 1;
        } else if run[i].is_punct('(') {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index of the `close` token balancing the `open` token at `start`.
fn balanced_end(run: &[Token<'_>], start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in run.iter().enumerate().skip(start) {
        if t.is_punct(open) {
            depth += 1;
        } else if t.is_punct(close) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index of the `)` matching the `(` at `open`.
fn matching_close(run: &[Token<'_>], open: usize) -> Option<usize> {
    balanced_end(run, open, '(', ')')
}

/// Index just past the `>` matching the `<` at `open`.
fn skip_angle_forward(run: &[Token<'_>], open: usize) -> Option<usize> {
    balanced_end(run, open, '<', '>').map(|close| close + 1)
}

/// Index of the `<` matching the `>` at `close`.
fn skip_angle_back(run: &[Token<'_>], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        if run[i].is_punct('>') {
            depth += 1;
        } else if run[i].is_punct('<') {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
