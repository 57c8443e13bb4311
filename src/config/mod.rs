pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::{CliConfig, LogFormat, SummaryFormat};

#[cfg(feature = "cli")]
mod args {
    use super::settings::Settings;
    use super::toml_config::FileConfig;
    use crate::core::StatusPolicy;
    use crate::utils::error::Result;
    use crate::utils::validation::parse_file_mode;
    use clap::{Parser, ValueEnum};
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
    pub enum SummaryFormat {
        #[default]
        Text,
        Json,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
    pub enum LogFormat {
        #[default]
        Compact,
        Json,
    }

    #[derive(Debug, Clone, Parser)]
    #[command(name = "profile-fetch")]
    #[command(about = "Wait for a profiling endpoint, then download its profile and string table")]
    pub struct CliConfig {
        /// Hostname or IP of the profiling target
        pub host: String,

        /// Target port [default: 8002]
        #[arg(long)]
        pub port: Option<u16>,

        /// URL scheme, http or https [default: http]
        #[arg(long)]
        pub scheme: Option<String>,

        /// Directory the `profile` and `strings` files are written to [default: .]
        #[arg(long)]
        pub output_dir: Option<String>,

        /// Octal mode for newly created files [default: 777]
        #[arg(long)]
        pub file_mode: Option<String>,

        /// Give up on the profile after this many attempts [default: unlimited]
        #[arg(long)]
        pub max_attempts: Option<u32>,

        /// Delay after the first failed attempt, in milliseconds [default: 100]
        #[arg(long)]
        pub retry_delay_ms: Option<u64>,

        /// Upper bound for the backoff delay, in milliseconds [default: 5000]
        #[arg(long)]
        pub max_retry_delay_ms: Option<u64>,

        /// Growth factor between consecutive delays [default: 2.0]
        #[arg(long)]
        pub backoff_multiplier: Option<f64>,

        /// Use exact backoff delays instead of randomized ones
        #[arg(long)]
        pub no_jitter: bool,

        /// Stop waiting for the profile after this many seconds
        #[arg(long)]
        pub deadline_secs: Option<u64>,

        /// Per-request timeout in seconds
        #[arg(long)]
        pub timeout_secs: Option<u64>,

        /// Only accept 2xx responses; others count as failed attempts
        #[arg(long)]
        pub require_success_status: bool,

        /// TOML configuration file
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Decode the downloaded files and print a summary
        #[arg(long)]
        pub summary: bool,

        #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
        pub summary_format: SummaryFormat,

        /// Number of scopes listed in the summary
        #[arg(long, default_value = "10")]
        pub top: usize,

        /// Print the run report as JSON
        #[arg(long)]
        pub report: bool,

        #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
        pub log_format: LogFormat,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Defaults, then the config file, then flags given on the command line.
        pub fn resolve(&self) -> Result<Settings> {
            let mut settings = Settings::new(self.host.trim());

            if let Some(path) = &self.config {
                tracing::debug!("Loading configuration from {}", path.display());
                settings.apply_file(&FileConfig::from_file(path)?)?;
            }

            if let Some(port) = self.port {
                settings.endpoint.port = port;
            }
            if let Some(scheme) = &self.scheme {
                settings.endpoint.scheme = scheme.clone();
            }
            if let Some(dir) = &self.output_dir {
                settings.output_dir = dir.clone();
            }
            if let Some(mode) = &self.file_mode {
                settings.file_mode = parse_file_mode("file_mode", mode)?;
            }
            if self.max_attempts.is_some() {
                settings.retry.max_attempts = self.max_attempts;
            }
            if let Some(ms) = self.retry_delay_ms {
                settings.retry.initial_delay = Duration::from_millis(ms);
            }
            if let Some(ms) = self.max_retry_delay_ms {
                settings.retry.max_delay = Duration::from_millis(ms);
            }
            if let Some(multiplier) = self.backoff_multiplier {
                settings.retry.multiplier = multiplier;
            }
            if self.no_jitter {
                settings.retry.jitter = false;
            }
            if let Some(secs) = self.deadline_secs {
                settings.retry.deadline = Some(Duration::from_secs(secs));
            }
            if let Some(secs) = self.timeout_secs {
                settings.request_timeout = Some(Duration::from_secs(secs));
            }
            if self.require_success_status {
                settings.status_policy = StatusPolicy::RequireSuccess;
            }

            Ok(settings)
        }
    }

}
