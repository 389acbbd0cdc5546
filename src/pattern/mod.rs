//! Compiled patterns and their match operations.

mod matches;

use std::fmt;

use grep_matcher::Captures;
use log::debug;

use crate::engine::{CompiledForm, EngineKind};
use crate::error::{Error, Result};
use crate::flags::{self, Flags};
use crate::normalize;

pub use matches::{Found, Match, Matches};

/// A pattern compiled by one engine, with a second anchored form for
/// [`fullmatch`](CompiledPattern::fullmatch).
///
/// Immutable once built, so it can be shared across threads freely. Later
/// engine preference changes do not affect an existing pattern.
///
/// Patterns with a trailing `(?x)` comment do not compile, since the comment
/// also swallows the anchored form's closing group; see
/// [`PatternEngine::anchor`](crate::engine::PatternEngine::anchor).
pub struct CompiledPattern {
    pattern: String,
    normalized: String,
    flags: Flags,
    id: String,
    engine: EngineKind,
    primary: Box<dyn CompiledForm>,
    anchored: Box<dyn CompiledForm>,
}

impl CompiledPattern {
    /// Normalize `pattern` and compile it, plus its anchored form, with the
    /// given engine.
    ///
    /// Either compilation failing fails the whole construction.
    pub fn new(pattern: &str, flags: Flags, id: &str, engine: EngineKind) -> Result<Self> {
        let backend = engine
            .engine()
            .ok_or(Error::EngineUnavailable { engine })?;
        let engine = backend.kind();
        let syntax_error = |message: String| Error::PatternSyntax {
            pattern: pattern.to_string(),
            id: id.to_string(),
            engine,
            message,
        };

        let normalized = normalize::normalize(pattern);
        let options = flags::translate(flags);
        let prepared = flags::apply_multiline(&normalized, flags);
        let anchored_pattern = backend.anchor(&prepared);

        debug!("compiling pattern {pattern:?} (id={id:?}) with {engine} engine, flags={flags}");
        let primary = backend.compile(&prepared, options).map_err(syntax_error)?;
        let anchored = backend
            .compile(&anchored_pattern, options)
            .map_err(syntax_error)?;

        Ok(Self {
            pattern: pattern.to_string(),
            normalized,
            flags,
            id: id.to_string(),
            engine,
            primary,
            anchored,
        })
    }

    /// The pattern exactly as supplied by the caller.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The pattern after escape expansion and word-boundary rewriting.
    #[must_use]
    pub fn normalized_pattern(&self) -> &str {
        &self.normalized
    }

    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Number of capture groups, not counting the whole match.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.primary.capture_count() - 1
    }

    #[must_use]
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.primary.capture_index(name)
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.primary.find_at(text, 0).is_some()
    }

    /// First match anywhere in `text`.
    #[must_use]
    pub fn search<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.finditer(text).next()
    }

    /// Match starting at the beginning of `text`.
    ///
    /// This is the leftmost match kept only when it starts at offset 0, so a
    /// failing call still tries every start offset. On the backtracking
    /// engine a pathological pattern backtracks at each of them; prefer
    /// [`fullmatch`](Self::fullmatch) when the whole text must match.
    #[must_use]
    pub fn r#match<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.search(text).filter(|m| m.start() == 0)
    }

    /// Match covering all of `text`.
    #[must_use]
    pub fn fullmatch<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let spans = if self.anchored.capture_count() > 1 {
            self.anchored.captures_at(text, 0)?
        } else {
            vec![Some(self.anchored.find_at(text, 0)?)]
        };
        Some(Match::new(text, spans))
    }

    /// Lazy iterator over non-overlapping matches. Each call starts over.
    #[must_use]
    pub fn finditer<'p, 't>(&'p self, text: &'t str) -> Matches<'p, 't> {
        Matches::new(self.primary.as_ref(), text, true)
    }

    /// All matches: whole matches, the single group's text, or all groups'
    /// text, depending on how many groups the pattern has.
    #[must_use]
    pub fn findall<'t>(&self, text: &'t str) -> Vec<Found<'t>> {
        self.finditer(text)
            .map(|m| Found::from_match(&m))
            .collect()
    }

    /// Replace up to `limit` matches (0 for all) with `replacement`.
    ///
    /// `$N` and `${N}` insert group `N`, `$name` and `${name}` insert a named
    /// group and `$$` inserts a literal `$`. A reference takes the longest run
    /// of `[_0-9A-Za-z]`, so `$1a` names a group `1a`; write `${1}a` instead.
    /// Groups that do not exist or did not participate expand to nothing.
    #[must_use]
    pub fn sub(&self, replacement: &str, text: &str, limit: usize) -> String {
        let matches = Matches::new(self.primary.as_ref(), text, replacement.contains('$'));

        let mut out = Vec::with_capacity(text.len());
        let mut last = 0;
        for m in limited(matches, limit) {
            out.extend_from_slice(text[last..m.start()].as_bytes());
            m.interpolate(
                |name| self.group_index(name),
                text.as_bytes(),
                replacement.as_bytes(),
                &mut out,
            );
            last = m.end();
        }
        out.extend_from_slice(text[last..].as_bytes());
        String::from_utf8(out)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    /// Split `text` around up to `limit` matches (0 for all).
    #[must_use]
    pub fn split<'t>(&self, text: &'t str, limit: usize) -> Vec<&'t str> {
        let matches = Matches::new(self.primary.as_ref(), text, false);

        let mut pieces = Vec::new();
        let mut last = 0;
        for m in limited(matches, limit) {
            pieces.push(&text[last..m.start()]);
            last = m.end();
        }
        pieces.push(&text[last..]);
        pieces
    }
}

fn limited<'p, 't>(matches: Matches<'p, 't>, limit: usize) -> impl Iterator<Item = Match<'t>> {
    let limit = if limit == 0 { usize::MAX } else { limit };
    matches.take(limit)
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompiledPattern({:?}, flags={}, backend={})",
            self.pattern, self.flags, self.engine
        )
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.pattern)
            .field("normalized", &self.normalized)
            .field("flags", &self.flags)
            .field("id", &self.id)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompiledPattern {
        CompiledPattern::new(pattern, Flags::NONE, "", EngineKind::Backtracking)
            .unwrap_or_else(|e| panic!("compile {pattern:?}: {e}"))
    }

    #[test]
    fn keeps_raw_pattern_after_rewrite() {
        let p = compile(r"\b가\b");
        assert_eq!(p.pattern(), r"\b가\b");
        assert_eq!(p.normalized_pattern(), "가");
    }

    #[test]
    fn display_matches_repr_shape() {
        let p = CompiledPattern::new(r"\d+", Flags::IGNORECASE, "", EngineKind::Backtracking)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            p.to_string(),
            r#"CompiledPattern("\\d+", flags=2, backend=backtracking)"#
        );
    }

    #[test]
    fn empty_matches_do_not_repeat() {
        let p = compile(r"\d*");
        let found: Vec<_> = p.finditer("a12").map(|m| m.range()).collect();
        assert_eq!(found, vec![0..0, 1..3]);
    }

    #[test]
    fn empty_matches_step_over_multibyte_chars() {
        let p = compile("x*");
        let found: Vec<_> = p.finditer("가a").map(|m| m.start()).collect();
        assert_eq!(found, vec![0, 3, 4]);
    }

    #[test]
    fn finditer_restarts_per_call() {
        let p = compile(r"\d");
        assert_eq!(p.finditer("1a2").count(), 2);
        assert_eq!(p.finditer("1a2").count(), 2);
    }

    #[test]
    fn multiline_directive_does_not_leak_into_fullmatch_anchors() {
        let p = CompiledPattern::new(r"^\d+$", Flags::MULTILINE, "", EngineKind::Backtracking)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(p.search("abc\n123").is_some());
        assert!(p.fullmatch("123\n456").is_none());
        assert!(p.fullmatch("123").is_some());
    }

    #[test]
    fn group_count_excludes_whole_match() {
        assert_eq!(compile(r"\d+").group_count(), 0);
        assert_eq!(compile(r"(\d)(?<x>\d)").group_count(), 2);
    }
}
