use thiserror::Error;

/// Failure to load a payload from disk or stdin.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to read payload: {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("payload is not valid JSON: {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PayloadError {
    /// Where the payload came from (`<stdin>` for piped input).
    pub fn path(&self) -> &str {
        match self {
            PayloadError::Io { path, .. } | PayloadError::Json { path, .. } => path,
        }
    }
}
