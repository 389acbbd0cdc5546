#![allow(dead_code)]

use std::sync::Once;

use kodegen_regex_compat::{Availability, CompiledPattern, Compiler, EnginePreference, Flags};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .is_test(true)
            .init();
    });
}

/// Every preference that can be satisfied in this build.
pub fn preferences() -> Vec<EnginePreference> {
    let mut prefs = vec![EnginePreference::Auto, EnginePreference::Backtracking];
    if Availability::detect().has_linear() {
        prefs.push(EnginePreference::Linear);
    }
    prefs
}

pub fn compiler(preference: EnginePreference) -> Compiler {
    init_logging();
    let compiler = Compiler::new();
    compiler
        .set_preference(preference)
        .unwrap_or_else(|e| panic!("set {preference}: {e}"));
    compiler
}

pub fn compile_with(preference: EnginePreference, pattern: &str, flags: Flags) -> CompiledPattern {
    compiler(preference)
        .compile(pattern, flags, "")
        .unwrap_or_else(|e| panic!("compile {pattern:?} with {preference}: {e}"))
}
