//! ReDoS-safe regex compilation for detection pipelines.
//!
//! Patterns compile with Rust's linear-time regex engine when it is present,
//! and with PCRE2 otherwise, or when the caller forces it to get look-around
//! and backreferences. Before compiling, `\uXXXX` escapes are expanded and
//! `\b` is dropped from CJK patterns (see [`normalize`]). Fullmatch is
//! emulated with an anchored second compilation.
//!
//! ```no_run
//! use kodegen_regex_compat::{compile, Flags};
//!
//! let zip = compile(r"\d{5}", Flags::NONE, "us/zip")?;
//! assert!(zip.fullmatch("12345").is_some());
//! assert!(zip.fullmatch("123456").is_none());
//! # Ok::<(), kodegen_regex_compat::Error>(())
//! ```

mod compiler;
mod config;
mod error;
mod flags;

pub mod engine;
pub mod normalize;
pub mod pattern;

use log::warn;
use once_cell::sync::Lazy;

pub use compiler::Compiler;
pub use config::{CompilerConfig, ENGINE_ENV_VAR, PatternDef};
pub use engine::{Availability, EngineKind, EnginePreference};
pub use error::{Error, Result};
pub use flags::{EngineOptions, Flags, apply_multiline, convert_flags, translate};
pub use pattern::{CompiledPattern, Found, Match, Matches};

static DEFAULT_COMPILER: Lazy<Compiler> = Lazy::new(|| {
    let compiler = Compiler::new();
    let preference = match CompilerConfig::from_env() {
        Ok(config) => config.engine,
        Err(err) => {
            warn!("ignoring {ENGINE_ENV_VAR}: {err}");
            return compiler;
        }
    };
    if let Err(err) = compiler.set_preference(preference) {
        warn!("ignoring {ENGINE_ENV_VAR}: {err}");
    }
    compiler
});

/// The process-wide compiler behind [`compile`] and the preference functions.
pub fn default_compiler() -> &'static Compiler {
    &DEFAULT_COMPILER
}

/// Set the process-wide engine preference.
///
/// Fails with [`Error::EngineUnavailable`] when forcing the linear engine in a
/// build without it; the previous preference stays in effect.
pub fn set_engine_preference(preference: EnginePreference) -> Result<()> {
    default_compiler().set_preference(preference)
}

/// The process-wide engine preference.
pub fn engine_preference() -> EnginePreference {
    default_compiler().preference()
}

/// Compile `pattern` with the process-wide compiler.
pub fn compile(pattern: &str, flags: Flags, id: &str) -> Result<CompiledPattern> {
    default_compiler().compile(pattern, flags, id)
}
