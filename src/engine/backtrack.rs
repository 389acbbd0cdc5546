//! Backtracking engine built on ripgrep's PCRE2 matcher.

use grep_pcre2::RegexMatcherBuilder;

use super::{CompiledForm, EngineKind, MatcherForm, PatternEngine};
use crate::flags::EngineOptions;

/// PCRE2 in UTF mode with Unicode properties. Supports look-around and
/// backreferences; matching time is bounded only by PCRE2's match limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingEngine;

impl PatternEngine for BacktrackingEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Backtracking
    }

    fn compile(
        &self,
        pattern: &str,
        options: EngineOptions,
    ) -> Result<Box<dyn CompiledForm>, String> {
        let mut builder = RegexMatcherBuilder::new();
        builder
            .caseless(options.case_insensitive)
            .dotall(options.dot_matches_new_line)
            .multi_line(false)
            .utf(true)
            .ucp(true);
        // The JIT fails with "no more memory" during compilation on 32 bit
        // systems, so only enable it on 64 bit.
        if cfg!(target_pointer_width = "64") {
            builder
                .jit_if_available(true)
                .max_jit_stack_size(Some(10 * (1 << 20)));
        }
        let matcher = builder.build(pattern).map_err(|err| err.to_string())?;
        Ok(Box::new(MatcherForm::new(matcher, EngineKind::Backtracking)))
    }

    /// PCRE2's `$` also matches before a trailing newline, so anchor on the
    /// absolute end of the haystack instead.
    fn anchor(&self, pattern: &str) -> String {
        format!(r"\A(?:{pattern})\z")
    }
}
