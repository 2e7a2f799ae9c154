//! Domain error types.

/// Top-level error type for emacross.
#[derive(Debug, thiserror::Error)]
pub enum EmacrossError {
    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("data integrity violation: {reason}")]
    DataIntegrity { reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("confirmation gate unavailable: {reason}")]
    GateUnavailable { reason: String },

    #[error("signal invariant violated: {reason}")]
    SignalInvariant { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EmacrossError> for std::process::ExitCode {
    fn from(err: &EmacrossError) -> Self {
        let code: u8 = match err {
            EmacrossError::Io(_) => 1,
            EmacrossError::ConfigParse { .. }
            | EmacrossError::ConfigMissing { .. }
            | EmacrossError::ConfigInvalid { .. } => 2,
            EmacrossError::Data { .. }
            | EmacrossError::DataIntegrity { .. }
            | EmacrossError::InsufficientData { .. } => 3,
            EmacrossError::GateUnavailable { .. } => 4,
            EmacrossError::SignalInvariant { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
