use crate::config::cli::DEFAULT_FILE_MODE;
use crate::config::toml_config::FileConfig;
use crate::core::retry::RetryPolicy;
use crate::core::{ConfigProvider, Endpoint, Resource, StatusPolicy};
use crate::domain::model::DEFAULT_PORT;
use crate::utils::error::Result;
use crate::utils::validation::{
    parse_file_mode, validate_host, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use std::time::Duration;

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub retry: RetryPolicy,
    pub status_policy: StatusPolicy,
    pub request_timeout: Option<Duration>,
    pub output_dir: String,
    pub file_mode: u32,
}

impl Settings {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::new(host, DEFAULT_PORT),
            retry: RetryPolicy::default(),
            status_policy: StatusPolicy::AcceptAny,
            request_timeout: None,
            output_dir: ".".to_string(),
            file_mode: DEFAULT_FILE_MODE,
        }
    }

    /// Overlays every value present in `file`.
    pub fn apply_file(&mut self, file: &FileConfig) -> Result<()> {
        if let Some(target) = &file.target {
            if let Some(port) = target.port {
                self.endpoint.port = port;
            }
            if let Some(scheme) = &target.scheme {
                self.endpoint.scheme = scheme.clone();
            }
        }

        if let Some(retry) = &file.retry {
            if retry.max_attempts.is_some() {
                self.retry.max_attempts = retry.max_attempts;
            }
            if let Some(ms) = retry.initial_delay_ms {
                self.retry.initial_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = retry.max_delay_ms {
                self.retry.max_delay = Duration::from_millis(ms);
            }
            if let Some(multiplier) = retry.multiplier {
                self.retry.multiplier = multiplier;
            }
            if let Some(jitter) = retry.jitter {
                self.retry.jitter = jitter;
            }
            if let Some(secs) = retry.deadline_seconds {
                self.retry.deadline = Some(Duration::from_secs(secs));
            }
        }

        if let Some(http) = &file.http {
            if let Some(secs) = http.timeout_seconds {
                self.request_timeout = Some(Duration::from_secs(secs));
            }
            if let Some(require) = http.require_success_status {
                self.status_policy = if require {
                    StatusPolicy::RequireSuccess
                } else {
                    StatusPolicy::AcceptAny
                };
            }
        }

        if let Some(output) = &file.output {
            if let Some(directory) = &output.directory {
                self.output_dir = directory.clone();
            }
            if let Some(mode) = &output.file_mode {
                self.file_mode = parse_file_mode("output.file_mode", mode)?;
            }
        }

        Ok(())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_host("host", &self.endpoint.host)?;
        validate_range("port", self.endpoint.port, 1, u16::MAX)?;
        validate_url("endpoint", &self.endpoint.url_for(Resource::Profile))?;
        validate_path("output_dir", &self.output_dir)?;
        validate_range("file_mode", self.file_mode, 0, 0o7777)?;

        if let Some(max_attempts) = self.retry.max_attempts {
            validate_positive_number("max_attempts", max_attempts, 1)?;
        }
        validate_range("backoff_multiplier", self.retry.multiplier, 1.0, 10.0)?;
        validate_range(
            "retry_delay_ms",
            self.retry.initial_delay.as_millis() as u64,
            0,
            self.retry.max_delay.as_millis() as u64,
        )?;
        if let Some(timeout) = self.request_timeout {
            validate_range("timeout_secs", timeout.as_secs(), 1, 3600)?;
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn file_mode(&self) -> u32 {
        self.file_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FetchError;

    #[test]
    fn test_defaults_point_at_profiling_port() {
        let settings = Settings::new("192.168.0.10");
        assert_eq!(
            settings.endpoint.url_for(Resource::Profile),
            "http://192.168.0.10:8002/profile"
        );
        assert_eq!(settings.output_dir, ".");
        assert_eq!(settings.file_mode, 0o777);
        assert_eq!(settings.status_policy, StatusPolicy::AcceptAny);
        assert!(settings.retry.max_attempts.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_apply_file_overrides_defaults() {
        let file = FileConfig::from_toml_str(
            r#"
[target]
port = 9100
[retry]
max_attempts = 3
jitter = false
[http]
require_success_status = true
timeout_seconds = 5
[output]
directory = "out"
file_mode = "0o640"
"#,
        )
        .unwrap();

        let mut settings = Settings::new("device");
        settings.apply_file(&file).unwrap();

        assert_eq!(settings.endpoint.port, 9100);
        assert_eq!(settings.retry.max_attempts, Some(3));
        assert!(!settings.retry.jitter);
        assert_eq!(settings.status_policy, StatusPolicy::RequireSuccess);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.output_dir, "out");
        assert_eq!(settings.file_mode, 0o640);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut empty_host = Settings::new("  ");
        assert!(empty_host.validate().is_err());
        empty_host.endpoint.host = "ok".to_string();
        assert!(empty_host.validate().is_ok());

        let mut zero_port = Settings::new("device");
        zero_port.endpoint.port = 0;
        assert!(zero_port.validate().is_err());

        let mut bad_scheme = Settings::new("device");
        bad_scheme.endpoint.scheme = "ftp".to_string();
        assert!(bad_scheme.validate().is_err());

        let mut no_attempts = Settings::new("device");
        no_attempts.retry.max_attempts = Some(0);
        assert!(no_attempts.validate().is_err());

        let mut inverted = Settings::new("device");
        inverted.retry.initial_delay = Duration::from_secs(10);
        inverted.retry.max_delay = Duration::from_secs(1);
        match inverted.validate() {
            Err(FetchError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "retry_delay_ms")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_nan_multiplier() {
        let mut settings = Settings::new("device");
        settings.retry.multiplier = f64::NAN;
        match settings.validate() {
            Err(FetchError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "backoff_multiplier")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_host_with_path() {
        // `dev/x` would otherwise parse as host `dev` with a path
        let settings = Settings::new("dev/x");
        match settings.validate() {
            Err(FetchError::InvalidConfigValueError { field, value, .. }) => {
                assert_eq!(field, "host");
                assert_eq!(value, "dev/x");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(Settings::new("fe80::1").validate().is_ok());
    }
}
