use crate::core::retry::RetryPolicy;
use crate::core::shutdown::Shutdown;
use crate::core::{
    ConfigProvider, Endpoint, FetchOutcome, FetchedResponse, Resource, RunReport, StatusPolicy,
    Storage, StringsOutcome, Transport,
};
use crate::utils::error::{FetchError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Downloads `profile` (retried until it answers) and then `strings` (once)
/// from a profiling endpoint, writing both through `Storage`.
pub struct ProfileFetcher<S: Storage, T: Transport> {
    storage: S,
    transport: T,
    endpoint: Endpoint,
    retry: RetryPolicy,
    status_policy: StatusPolicy,
    shutdown: Shutdown,
}

impl<S: Storage, T: Transport> ProfileFetcher<S, T> {
    pub fn new<C: ConfigProvider>(storage: S, transport: T, config: &C) -> Self {
        Self {
            storage,
            transport,
            endpoint: config.endpoint().clone(),
            retry: config.retry_policy().clone(),
            status_policy: config.status_policy(),
            shutdown: Shutdown::never(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn run(&self) -> Result<RunReport> {
        let profile = self.fetch_profile().await?;
        let strings = self.fetch_strings().await;

        Ok(RunReport {
            endpoint: self.endpoint.clone(),
            profile,
            strings,
        })
    }

    pub async fn fetch_profile(&self) -> Result<FetchOutcome> {
        let resource = Resource::Profile;
        let url = self.endpoint.url_for(resource);
        let started = Instant::now();
        let mut attempts: u32 = 0;
        tracing::info!("📡 Waiting for profile from {}", url);

        loop {
            attempts += 1;

            let result = match self.retry.deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_sub(started.elapsed());
                    match tokio::time::timeout(remaining, self.attempt(&url)).await {
                        Ok(result) => result,
                        Err(_) => {
                            return Err(FetchError::DeadlineExceededError {
                                url,
                                attempts,
                                deadline_secs: deadline.as_secs_f64(),
                                last_error: "request still in flight at deadline".to_string(),
                            })
                        }
                    }
                }
                None => self.attempt(&url).await,
            };

            let error = match result {
                Ok(response) => {
                    let outcome = self.store(resource, response, attempts).await?;
                    tracing::info!(
                        "✅ profile: {} bytes after {} attempt(s) -> {}",
                        outcome.bytes,
                        outcome.attempts,
                        outcome.path
                    );
                    return Ok(outcome);
                }
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if !self.retry.allows_another(attempts) {
                return Err(FetchError::RetriesExhaustedError {
                    url,
                    attempts,
                    last_error: error.to_string(),
                });
            }

            let delay = self.retry.delay_for(attempts);
            if let Some(deadline) = self.retry.deadline {
                if started.elapsed() + delay >= deadline {
                    return Err(FetchError::DeadlineExceededError {
                        url,
                        attempts,
                        deadline_secs: deadline.as_secs_f64(),
                        last_error: error.to_string(),
                    });
                }
            }

            // 第一次失敗才用 warn，之後降為 debug
            if attempts == 1 {
                tracing::warn!("⏳ {} not available yet ({}), retrying", url, error);
            } else {
                tracing::debug!("Attempt {} on {} failed: {}", attempts, url, error);
            }

            self.pause(&url, delay).await?;
        }
    }

    /// Single attempt; failures end up in the outcome, never as an error.
    pub async fn fetch_strings(&self) -> StringsOutcome {
        let resource = Resource::Strings;
        let url = self.endpoint.url_for(resource);

        let response = match self.attempt(&url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("⚠️ Skipping strings: {}", e);
                return StringsOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match self.store(resource, response, 1).await {
            Ok(outcome) => {
                tracing::info!("✅ strings: {} bytes -> {}", outcome.bytes, outcome.path);
                StringsOutcome::Fetched(outcome)
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not write strings: {}", e);
                StringsOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<FetchedResponse> {
        let response = tokio::select! {
            biased;
            _ = self.shutdown.wait() => {
                return Err(FetchError::CancelledError { url: url.to_string() });
            }
            result = self.transport.get(url) => result?,
        };

        if self.status_policy == StatusPolicy::RequireSuccess && !response.meta.is_success() {
            return Err(FetchError::UnexpectedStatusError {
                url: url.to_string(),
                status: response.meta.status,
            });
        }

        Ok(response)
    }

    async fn pause(&self, url: &str, delay: Duration) -> Result<()> {
        if delay.is_zero() {
            // 零延遲仍需讓出執行權
            if self.shutdown.is_triggered() {
                return Err(FetchError::CancelledError { url: url.to_string() });
            }
            tokio::task::yield_now().await;
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = self.shutdown.wait() => Err(FetchError::CancelledError { url: url.to_string() }),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn store(
        &self,
        resource: Resource,
        response: FetchedResponse,
        attempts: u32,
    ) -> Result<FetchOutcome> {
        tracing::debug!(
            "Writing {} bytes of {} (status {})",
            response.body.len(),
            resource,
            response.meta.status
        );
        let path = self
            .storage
            .write_file(resource.file_name(), &response.body)
            .await?;

        Ok(FetchOutcome {
            resource,
            response: response.meta,
            bytes: response.body.len(),
            attempts,
            path,
            fetched_at: chrono::Utc::now(),
        })
    }
}
