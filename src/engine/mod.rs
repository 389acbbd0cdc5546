/*!
Regex engine selection and the capability both engines provide.

Two engines back compiled patterns:

* the linear engine (Rust's finite automata regex, via `grep-regex`), which
  guarantees matching time linear in the haystack but rejects look-around and
  backreferences;
* the backtracking engine (PCRE2, via `grep-pcre2`), which supports the richer
  dialect without any such guarantee.

Selection happens once per compilation from the caller's [`EnginePreference`]
and the engines present in the process ([`Availability`]). A pattern that
fails on the selected engine is not retried on the other one.
*/

mod backtrack;
#[cfg(feature = "linear")]
mod linear;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use grep_matcher::{Captures, Matcher};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flags::EngineOptions;

pub use backtrack::BacktrackingEngine;
#[cfg(feature = "linear")]
pub use linear::LinearEngine;

/// The engine backing a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Linear,
    Backtracking,
}

impl EngineKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Backtracking => "backtracking",
        }
    }

    /// Returns the engine implementation, or `None` when it is not compiled in.
    #[must_use]
    pub fn engine(self) -> Option<&'static dyn PatternEngine> {
        match self {
            #[cfg(feature = "linear")]
            Self::Linear => Some(&LinearEngine),
            #[cfg(not(feature = "linear"))]
            Self::Linear => None,
            Self::Backtracking => Some(&BacktrackingEngine),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which engine new compilations should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnginePreference {
    /// Linear engine when available, otherwise backtracking
    #[default]
    Auto,
    /// Always the linear engine; rejected up front when it is unavailable
    #[serde(alias = "re2")]
    Linear,
    /// Always the backtracking engine
    #[serde(alias = "standard")]
    Backtracking,
}

impl EnginePreference {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Linear => "linear",
            Self::Backtracking => "backtracking",
        }
    }
}

impl FromStr for EnginePreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "linear" | "re2" => Ok(Self::Linear),
            "backtracking" | "standard" => Ok(Self::Backtracking),
            _ => Err(Error::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EnginePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engines present in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    linear: bool,
}

impl Availability {
    /// Engines compiled into this build.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            linear: cfg!(feature = "linear"),
        }
    }

    /// Hide the linear engine, as if it were not compiled in.
    #[must_use]
    pub fn backtracking_only() -> Self {
        Self { linear: false }
    }

    #[must_use]
    pub fn has_linear(self) -> bool {
        self.linear
    }

    /// Check that `preference` can be satisfied.
    pub fn check(self, preference: EnginePreference) -> Result<()> {
        if preference == EnginePreference::Linear && !self.linear {
            return Err(Error::EngineUnavailable {
                engine: EngineKind::Linear,
            });
        }
        Ok(())
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::detect()
    }
}

/// Decide which engine backs the next compilation.
///
/// | preference   | linear available | engine       |
/// |--------------|------------------|--------------|
/// | auto         | yes              | linear       |
/// | auto         | no               | backtracking |
/// | linear       | yes              | linear       |
/// | linear       | no               | error        |
/// | backtracking | any              | backtracking |
pub fn select(preference: EnginePreference, availability: Availability) -> Result<EngineKind> {
    availability.check(preference)?;
    Ok(match preference {
        EnginePreference::Auto if availability.has_linear() => EngineKind::Linear,
        EnginePreference::Auto => EngineKind::Backtracking,
        EnginePreference::Linear => EngineKind::Linear,
        EnginePreference::Backtracking => EngineKind::Backtracking,
    })
}

/// A regex engine able to compile normalized patterns.
pub trait PatternEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Compile `pattern`, returning the engine's diagnostic on failure.
    fn compile(
        &self,
        pattern: &str,
        options: EngineOptions,
    ) -> std::result::Result<Box<dyn CompiledForm>, String>;

    /// Wrap `pattern` so it only matches the entire haystack.
    ///
    /// The non-capturing group keeps top-level alternation inside the anchors
    /// and leaves capture group numbering unchanged.
    ///
    /// A pattern ending in an inline-verbose comment (`(?x)\d+ # digits`)
    /// cannot be wrapped: the comment runs to the end of the pattern and
    /// swallows the closing `)`, so compilation fails on both engines.
    fn anchor(&self, pattern: &str) -> String {
        format!("^(?:{pattern})$")
    }
}

/// Byte span of a match or capture group.
pub type Span = Range<usize>;

/// A compiled regex, independent of the engine that produced it.
///
/// Offsets are byte offsets into the haystack. Searches never fail: runtime
/// engine errors are logged and reported as no match.
pub trait CompiledForm: Send + Sync + fmt::Debug {
    /// Leftmost match starting at or after `at`.
    fn find_at(&self, haystack: &str, at: usize) -> Option<Span>;

    /// Like `find_at`, also reporting every group. Index 0 is the whole match.
    fn captures_at(&self, haystack: &str, at: usize) -> Option<Vec<Option<Span>>>;

    /// Number of groups, including group 0.
    fn capture_count(&self) -> usize;

    fn capture_index(&self, name: &str) -> Option<usize>;
}

/// Adapts any `grep_matcher::Matcher` to [`CompiledForm`].
#[derive(Debug)]
pub(crate) struct MatcherForm<M> {
    matcher: M,
    engine: EngineKind,
}

impl<M> MatcherForm<M> {
    pub(crate) fn new(matcher: M, engine: EngineKind) -> Self {
        Self { matcher, engine }
    }
}

impl<M> CompiledForm for MatcherForm<M>
where
    M: Matcher + Send + Sync + fmt::Debug,
{
    fn find_at(&self, haystack: &str, at: usize) -> Option<Span> {
        match self.matcher.find_at(haystack.as_bytes(), at) {
            Ok(found) => found.map(|m| m.start()..m.end()),
            Err(err) => {
                warn!("{} engine search failed, treating as no match: {err}", self.engine);
                None
            }
        }
    }

    fn captures_at(&self, haystack: &str, at: usize) -> Option<Vec<Option<Span>>> {
        let mut caps = match self.matcher.new_captures() {
            Ok(caps) => caps,
            Err(err) => {
                warn!("{} engine could not allocate captures: {err}", self.engine);
                return None;
            }
        };
        match self.matcher.captures_at(haystack.as_bytes(), at, &mut caps) {
            Ok(true) => Some(
                (0..caps.len())
                    .map(|i| caps.get(i).map(|m| m.start()..m.end()))
                    .collect(),
            ),
            Ok(false) => None,
            Err(err) => {
                warn!("{} engine search failed, treating as no match: {err}", self.engine);
                None
            }
        }
    }

    fn capture_count(&self) -> usize {
        self.matcher.capture_count().max(1)
    }

    fn capture_index(&self, name: &str) -> Option<usize> {
        self.matcher.capture_index(name)
    }
}
