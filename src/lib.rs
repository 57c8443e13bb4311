pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, settings::Settings, toml_config::FileConfig};
pub use core::{
    fetcher::ProfileFetcher, http::HttpTransport, retry::RetryPolicy, summary::ProfileSummary,
};
pub use domain::model::{Endpoint, FetchOutcome, Resource, RunReport, StringsOutcome};
pub use domain::ports::StatusPolicy;
pub use utils::error::{FetchError, Result};
