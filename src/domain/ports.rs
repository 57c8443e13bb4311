use crate::core::retry::RetryPolicy;
use crate::domain::model::{Endpoint, FetchedResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Writes `data` to `path`, replacing any previous content, and returns
    /// the full path written.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET and reads the whole body. Only transport-level failures
    /// are errors; any HTTP status is returned as a response.
    async fn get(&self, url: &str) -> Result<FetchedResponse>;
}

/// How HTTP status codes of otherwise successful responses are judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusPolicy {
    #[default]
    AcceptAny,
    RequireSuccess,
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &Endpoint;
    fn retry_policy(&self) -> &RetryPolicy;
    fn status_policy(&self) -> StatusPolicy;
    fn output_dir(&self) -> &str;
    fn file_mode(&self) -> u32;
}
