//! Match values and the lazy match iterator.

use std::iter::FusedIterator;

use grep_matcher::Captures;

use crate::engine::{CompiledForm, Span};

/// A single match with its capture groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    haystack: &'t str,
    /// Group 0 is always present.
    spans: Vec<Option<Span>>,
}

impl<'t> Match<'t> {
    pub(crate) fn new(haystack: &'t str, spans: Vec<Option<Span>>) -> Self {
        Self { haystack, spans }
    }

    /// The matched text.
    #[must_use]
    pub fn as_str(&self) -> &'t str {
        self.group(0).unwrap_or_default()
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.range().start
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.range().end
    }

    /// Byte range of the whole match.
    #[must_use]
    pub fn range(&self) -> Span {
        self.spans
            .first()
            .cloned()
            .flatten()
            .unwrap_or_default()
    }

    /// Text of group `index`; `None` if the group did not participate or
    /// does not exist.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&'t str> {
        self.group_range(index)
            .and_then(|span| self.haystack.get(span))
    }

    #[must_use]
    pub fn group_range(&self, index: usize) -> Option<Span> {
        self.spans.get(index).cloned().flatten()
    }

    /// Groups 1.., in order.
    pub fn groups(&self) -> impl Iterator<Item = Option<&'t str>> + '_ {
        (1..self.spans.len()).map(|i| self.group(i))
    }

    /// Number of groups, excluding group 0.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.spans.len().saturating_sub(1)
    }
}

/// Lets `grep_matcher` interpolate `$1` / `${name}` replacement templates
/// straight from a match's spans.
impl Captures for Match<'_> {
    fn len(&self) -> usize {
        self.spans.len()
    }

    fn get(&self, i: usize) -> Option<grep_matcher::Match> {
        self.group_range(i)
            .map(|span| grep_matcher::Match::new(span.start, span.end))
    }
}

/// One `findall` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found<'t> {
    /// The whole match, or the only group when the pattern has exactly one
    Text(&'t str),
    /// One entry per group when the pattern has two or more
    Groups(Vec<&'t str>),
}

impl<'t> Found<'t> {
    pub(crate) fn from_match(m: &Match<'t>) -> Self {
        match m.group_count() {
            0 => Found::Text(m.as_str()),
            1 => Found::Text(m.group(1).unwrap_or_default()),
            _ => Found::Groups(m.groups().map(Option::unwrap_or_default).collect()),
        }
    }

    /// The text, for `Text` results.
    #[must_use]
    pub fn as_text(&self) -> Option<&'t str> {
        match self {
            Found::Text(text) => Some(*text),
            Found::Groups(_) => None,
        }
    }
}

/// Non-overlapping matches, left to right.
///
/// An empty match adjacent to the previous match is skipped, and searching
/// resumes at the next character boundary after an empty match.
#[derive(Debug)]
pub struct Matches<'p, 't> {
    form: &'p dyn CompiledForm,
    haystack: &'t str,
    with_groups: bool,
    at: usize,
    last_end: Option<usize>,
}

impl<'p, 't> Matches<'p, 't> {
    pub(crate) fn new(form: &'p dyn CompiledForm, haystack: &'t str, with_groups: bool) -> Self {
        Self {
            form,
            haystack,
            with_groups: with_groups && form.capture_count() > 1,
            at: 0,
            last_end: None,
        }
    }

    fn locate(&self) -> Option<Vec<Option<Span>>> {
        if self.with_groups {
            self.form.captures_at(self.haystack, self.at)
        } else {
            self.form
                .find_at(self.haystack, self.at)
                .map(|span| vec![Some(span)])
        }
    }

    /// First char boundary strictly after `pos`.
    fn step_past(&self, pos: usize) -> usize {
        let mut next = pos + 1;
        while next < self.haystack.len() && !self.haystack.is_char_boundary(next) {
            next += 1;
        }
        next
    }
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        while self.at <= self.haystack.len() {
            let Some(spans) = self.locate() else {
                self.at = self.haystack.len() + 1;
                return None;
            };
            let span = spans.first().cloned().flatten()?;

            let on_boundaries = self.haystack.is_char_boundary(span.start)
                && self.haystack.is_char_boundary(span.end);
            if !on_boundaries {
                self.at = self.step_past(span.start.max(self.at));
                continue;
            }
            if span.is_empty() {
                if self.last_end == Some(span.end) {
                    self.at = self.step_past(span.end);
                    continue;
                }
                self.at = self.step_past(span.end);
            } else {
                self.at = span.end;
            }
            self.last_end = Some(span.end);
            return Some(Match::new(self.haystack, spans));
        }
        None
    }
}

impl FusedIterator for Matches<'_, '_> {}
