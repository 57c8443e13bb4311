use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Transport failure on {url}: {message}")]
    TransportError { url: String, message: String },

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatusError { url: String, status: u16 },

    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhaustedError {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Deadline of {deadline_secs:.1}s exceeded waiting for {url} ({attempts} attempts): {last_error}")]
    DeadlineExceededError {
        url: String,
        attempts: u32,
        deadline_secs: f64,
        last_error: String,
    },

    #[error("Cancelled while fetching {url}")]
    CancelledError { url: String },

    #[error("Decode error: {message}")]
    DecodeError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Interrupted,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::HttpError(_)
            | FetchError::TransportError { .. }
            | FetchError::UnexpectedStatusError { .. }
            | FetchError::RetriesExhaustedError { .. }
            | FetchError::DeadlineExceededError { .. } => ErrorCategory::Network,
            FetchError::IoError(_) => ErrorCategory::Storage,
            FetchError::TomlError(_)
            | FetchError::ConfigError { .. }
            | FetchError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FetchError::CancelledError { .. } => ErrorCategory::Interrupted,
            FetchError::DecodeError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Interrupted => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Whether a fetch attempt that failed with this error may be repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::HttpError(_)
                | FetchError::TransportError { .. }
                | FetchError::UnexpectedStatusError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FetchError::HttpError(e) => format!("Could not set up the HTTP client: {}", e),
            FetchError::TransportError { url, message } => {
                format!("Could not reach {}: {}", url, message)
            }
            FetchError::IoError(e) => format!("Could not write output file: {}", e),
            FetchError::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            FetchError::RetriesExhaustedError { url, attempts, .. } => {
                format!("{} did not answer after {} attempts", url, attempts)
            }
            FetchError::DeadlineExceededError { url, .. } => {
                format!("{} did not answer before the deadline", url)
            }
            FetchError::CancelledError { .. } => "Interrupted before the profile was fetched".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the target is running and listening on the profiling port (--port)"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Review the command-line flags and configuration file",
            ErrorCategory::Interrupted => "Re-run the command to start waiting again",
            ErrorCategory::Data => "The payload may come from an incompatible profiler version",
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let exhausted = FetchError::RetriesExhaustedError {
            url: "http://target:8002/profile".to_string(),
            attempts: 3,
            last_error: "connection refused".to_string(),
        };
        assert_eq!(exhausted.category(), ErrorCategory::Network);
        assert_eq!(exhausted.severity(), ErrorSeverity::Medium);

        let bad_port = FetchError::InvalidConfigValueError {
            field: "port".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 1 and 65535".to_string(),
        };
        assert_eq!(bad_port.severity(), ErrorSeverity::High);

        let io = FetchError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_only_transport_and_status_errors_retry() {
        let status = FetchError::UnexpectedStatusError {
            url: "http://target:8002/profile".to_string(),
            status: 503,
        };
        assert!(status.is_retryable());

        let cancelled = FetchError::CancelledError {
            url: "http://target:8002/profile".to_string(),
        };
        assert!(!cancelled.is_retryable());
        assert!(!FetchError::DecodeError {
            message: "short".to_string()
        }
        .is_retryable());
    }
}
