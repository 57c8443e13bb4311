use crate::utils::error::{FetchError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional configuration file. Every field may be omitted; command-line
/// flags take precedence over anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub target: Option<TargetConfig>,
    pub retry: Option<RetryConfig>,
    pub http: Option<HttpConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub port: Option<u16>,
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub multiplier: Option<f64>,
    pub jitter: Option<bool>,
    pub deadline_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub require_success_status: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub file_mode: Option<String>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FetchError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FetchError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = FileConfig::from_toml_str(
            r#"
[target]
port = 9002
scheme = "https"

[retry]
max_attempts = 20
initial_delay_ms = 250
max_delay_ms = 10000
multiplier = 1.5
jitter = false
deadline_seconds = 120

[http]
timeout_seconds = 30
require_success_status = true

[output]
directory = "captures"
file_mode = "644"
"#,
        )
        .unwrap();

        let target = config.target.unwrap();
        assert_eq!(target.port, Some(9002));
        assert_eq!(target.scheme.as_deref(), Some("https"));

        let retry = config.retry.unwrap();
        assert_eq!(retry.max_attempts, Some(20));
        assert_eq!(retry.multiplier, Some(1.5));
        assert_eq!(retry.jitter, Some(false));

        assert_eq!(config.http.unwrap().require_success_status, Some(true));
        assert_eq!(config.output.unwrap().file_mode.as_deref(), Some("644"));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert!(config.target.is_none());
        assert!(config.retry.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = FileConfig::from_toml_str("[target]\nhots = \"typo\"\n");
        assert!(matches!(result, Err(FetchError::TomlError(_))));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("PROFILE_FETCH_TEST_DIR", "/tmp/captures");
        let config = FileConfig::from_toml_str(
            "[output]\ndirectory = \"${PROFILE_FETCH_TEST_DIR}\"\nfile_mode = \"${PROFILE_FETCH_UNSET_VAR}\"\n",
        )
        .unwrap();

        let output = config.output.unwrap();
        assert_eq!(output.directory.as_deref(), Some("/tmp/captures"));
        assert_eq!(output.file_mode.as_deref(), Some("${PROFILE_FETCH_UNSET_VAR}"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[target]\nport = 8100").unwrap();

        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.target.unwrap().port, Some(8100));
    }
}
