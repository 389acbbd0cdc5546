//! The compile entry point and its engine preference.

use log::{debug, info};
use parking_lot::RwLock;

use crate::config::{CompilerConfig, PatternDef};
use crate::engine::{self, Availability, EngineKind, EnginePreference};
use crate::error::Result;
use crate::flags::Flags;
use crate::pattern::CompiledPattern;

/// Compiles patterns according to an engine preference.
///
/// The preference can change at any time; each compilation reads it once, and
/// patterns already compiled keep their engine. Concurrent changes are not
/// ordered against in-flight compilations.
#[derive(Debug)]
pub struct Compiler {
    preference: RwLock<EnginePreference>,
    availability: Availability,
}

impl Compiler {
    /// A compiler using every engine in this build, preferring `auto`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_availability(Availability::detect())
    }

    /// A compiler limited to the given engines.
    #[must_use]
    pub fn with_availability(availability: Availability) -> Self {
        Self {
            preference: RwLock::new(EnginePreference::Auto),
            availability,
        }
    }

    /// A compiler with the preference from `config`.
    pub fn from_config(config: &CompilerConfig) -> Result<Self> {
        let compiler = Self::new();
        compiler.set_preference(config.engine)?;
        Ok(compiler)
    }

    /// Change the engine used for future compilations.
    ///
    /// Forcing the linear engine when it is unavailable fails and leaves the
    /// current preference in place.
    pub fn set_preference(&self, preference: EnginePreference) -> Result<()> {
        self.availability.check(preference)?;
        *self.preference.write() = preference;
        info!("Regex engine preference set to: {preference}");
        Ok(())
    }

    #[must_use]
    pub fn preference(&self) -> EnginePreference {
        *self.preference.read()
    }

    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// The engine the next compilation would use.
    pub fn select(&self) -> Result<EngineKind> {
        engine::select(self.preference(), self.availability)
    }

    /// Compile `pattern` with `flags`. `id` labels the pattern in errors and
    /// logs and may be empty.
    pub fn compile(&self, pattern: &str, flags: Flags, id: &str) -> Result<CompiledPattern> {
        let engine = self.select()?;
        debug!("selected {engine} engine (preference: {})", self.preference());
        CompiledPattern::new(pattern, flags, id, engine)
    }

    /// Compile a stored pattern definition, converting its flag names.
    pub fn compile_def(&self, def: &PatternDef) -> Result<CompiledPattern> {
        self.compile(&def.pattern, Flags::from_names(&def.flags), &def.id)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
