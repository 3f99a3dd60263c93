use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("progress sink failed: {message}")]
    Progress { message: String },
}

impl AnalysisError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// For `ProgressSink` implementations outside the crate.
    pub fn progress(err: impl std::fmt::Display) -> Self {
        Self::Progress {
            message: err.to_string(),
        }
    }
}
