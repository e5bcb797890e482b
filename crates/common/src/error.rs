//! Error types shared across TrustCall crates.

/// Top-level error type for TrustCall operations.
///
/// Feature extraction and fusion never fail; errors only come from the
/// edges: reading pixels, encoding snapshots, writing sinks, and config.
#[derive(Debug, thiserror::Error)]
pub enum TrustcallError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    /// Pixel read-back refused by the source (for example a cross-origin
    /// media element).
    #[error("Capture blocked: {message}")]
    CaptureBlocked { message: String },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Sink error: {message}")]
    Sink { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using TrustcallError.
pub type TrustcallResult<T> = Result<T, TrustcallError>;

impl TrustcallError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn capture_blocked(msg: impl Into<String>) -> Self {
        Self::CaptureBlocked {
            message: msg.into(),
        }
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the failure came from a source refusing pixel access.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::CaptureBlocked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = TrustcallError::sink("disk full");
        assert_eq!(err.to_string(), "Sink error: disk full");
        assert!(!err.is_blocked());
        assert!(TrustcallError::capture_blocked("cross-origin").is_blocked());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TrustcallError = io.into();
        assert!(matches!(err, TrustcallError::Io(_)));
    }
}
