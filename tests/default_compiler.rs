//! The process-wide compiler. Kept to a single test so no other test in this
//! binary observes its preference changing.

mod common;

use common::init_logging;
use kodegen_regex_compat::{
    Availability, EngineKind, EnginePreference, compile, engine_preference, set_engine_preference,
};

#[test]
fn process_wide_preference_round_trip() {
    init_logging();
    if std::env::var_os(kodegen_regex_compat::ENGINE_ENV_VAR).is_none() {
        assert_eq!(engine_preference(), EnginePreference::Auto);
    }

    set_engine_preference(EnginePreference::Backtracking).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(engine_preference(), EnginePreference::Backtracking);
    let forced = compile(r"(?<=x)\d", Default::default(), "").unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(forced.engine(), EngineKind::Backtracking);

    set_engine_preference(EnginePreference::Auto).unwrap_or_else(|e| panic!("{e}"));
    let auto = compile(r"\d", Default::default(), "").unwrap_or_else(|e| panic!("{e}"));
    let expected = if Availability::detect().has_linear() {
        EngineKind::Linear
    } else {
        EngineKind::Backtracking
    };
    assert_eq!(auto.engine(), expected);
    assert_eq!(forced.engine(), EngineKind::Backtracking);

    let linear = set_engine_preference(EnginePreference::Linear);
    if Availability::detect().has_linear() {
        assert!(linear.is_ok());
    } else {
        let err = linear.expect_err("linear engine is not in this build");
        assert!(err.is_configuration());
        assert_eq!(engine_preference(), EnginePreference::Auto);
    }
}
