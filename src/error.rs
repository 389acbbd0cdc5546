use crate::engine::EngineKind;

/// Regex compatibility layer error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested engine is not compiled into this process
    #[error("{engine} regex engine requested but it is not available in this build")]
    EngineUnavailable { engine: EngineKind },

    /// Malformed pattern, or a construct the selected engine does not support
    #[error("invalid pattern {pattern:?}{} ({engine} engine): {message}", id_suffix(.id))]
    PatternSyntax {
        pattern: String,
        id: String,
        engine: EngineKind,
        message: String,
    },

    /// Flag bits outside IGNORECASE, MULTILINE and DOTALL
    #[error("unsupported regex flag bits: {bits:#x}")]
    UnsupportedFlags { bits: u32 },

    /// Engine preference name that is not one of auto, linear or backtracking
    #[error("unknown regex engine: {0:?} (expected auto, linear or backtracking)")]
    UnknownEngine(String),

    /// Configuration could not be read or parsed
    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type using the regex compatibility Error
pub type Result<T> = std::result::Result<T, Error>;

fn id_suffix(id: &str) -> String {
    if id.is_empty() {
        String::new()
    } else {
        format!(" [{id}]")
    }
}

impl Error {
    /// Returns true for errors raised by `set_preference` and config loading
    /// when the requested engine cannot be used.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::EngineUnavailable { .. })
    }

    /// Returns true for pattern compilation failures.
    #[must_use]
    pub fn is_pattern_syntax(&self) -> bool {
        matches!(self, Error::PatternSyntax { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_syntax_message_includes_id_when_present() {
        let err = Error::PatternSyntax {
            pattern: "[".to_string(),
            id: "kr/phone".to_string(),
            engine: EngineKind::Backtracking,
            message: "missing terminating ]".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"[\""), "got: {msg}");
        assert!(msg.contains("[kr/phone]"), "got: {msg}");
        assert!(msg.contains("backtracking"), "got: {msg}");
        assert!(err.is_pattern_syntax());
        assert!(!err.is_configuration());
    }

    #[test]
    fn pattern_syntax_message_omits_empty_id() {
        let err = Error::PatternSyntax {
            pattern: "(".to_string(),
            id: String::new(),
            engine: EngineKind::Linear,
            message: "unclosed group".to_string(),
        };
        assert!(!err.to_string().contains('['));
    }

    #[test]
    fn unavailable_engine_is_configuration_error() {
        let err = Error::EngineUnavailable {
            engine: EngineKind::Linear,
        };
        assert!(err.is_configuration());
        assert!(err.to_string().contains("linear"));
    }
}
