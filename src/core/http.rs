use crate::core::{FetchedResponse, ResponseMeta, Transport};
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// `reqwest`-backed transport. No request headers, query or body are sent.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FetchedResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        tracing::debug!("Response status: {}", response.status());

        let meta = ResponseMeta {
            url: response.url().to_string(),
            status: response.status().as_u16(),
            content_length: response.content_length(),
            headers: response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        value.to_str().unwrap_or("<non-ascii>").to_string(),
                    )
                })
                .collect(),
        };

        // 讀取中斷的 body 與連線失敗同樣處理
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?
            .to_vec();

        Ok(FetchedResponse { meta, body })
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    let kind = if e.is_timeout() {
        "timed out"
    } else if e.is_connect() {
        "connect failed"
    } else {
        "request failed"
    };
    FetchError::TransportError {
        url: url.to_string(),
        message: format!("{}: {}", kind, e),
    }
}
