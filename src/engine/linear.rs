//! Linear-time engine built on ripgrep's Rust regex matcher.

use grep_regex::RegexMatcherBuilder;
use log::debug;

use super::{CompiledForm, EngineKind, MatcherForm, PatternEngine};
use crate::flags::EngineOptions;

/// Rust's finite automata regex engine. Matching time is linear in the
/// haystack for every pattern it accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearEngine;

impl PatternEngine for LinearEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Linear
    }

    fn compile(
        &self,
        pattern: &str,
        options: EngineOptions,
    ) -> Result<Box<dyn CompiledForm>, String> {
        let mut builder = RegexMatcherBuilder::new();
        builder
            .unicode(true)
            .octal(false)
            .multi_line(false)
            .crlf(false)
            .line_terminator(None);

        if options.case_insensitive {
            debug!("Setting linear matcher to case INSENSITIVE");
        }
        builder
            .case_insensitive(options.case_insensitive)
            .dot_matches_new_line(options.dot_matches_new_line);

        let matcher = builder
            .build(pattern)
            .map_err(|err| suggest_backtracking(err.to_string()))?;
        Ok(Box::new(MatcherForm::new(matcher, EngineKind::Linear)))
    }
}

/// Possibly suggest the backtracking engine based on the error message given.
///
/// Look-around and backreferences are the two constructs the linear engine
/// rejects that PCRE2 handles.
fn suggest_backtracking(msg: String) -> String {
    if !msg.contains("backreferences") && !msg.contains("look-around") {
        return msg;
    }
    format!(
        "{msg}

Consider forcing the backtracking engine, which can handle backreferences
and look-around but does not guarantee linear-time matching.",
    )
}
