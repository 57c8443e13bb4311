use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PORT: u16 = 8002;

/// The two resources served by the profiling endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Profile,
    Strings,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Profile => "/profile",
            Resource::Strings => "/strings",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Resource::Profile => "profile",
            Resource::Strings => "strings",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Host as it must appear in a URL authority; bare IPv6 literals get brackets.
    pub fn authority_host(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    pub fn url_for(&self, resource: Resource) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme,
            self.authority_host(),
            self.port,
            resource.path()
        )
    }
}

/// What survives of an HTTP response once the body has been read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub url: String,
    pub status: u16,
    pub content_length: Option<u64>,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for ResponseMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.url)?;
        if let Some(len) = self.content_length {
            write!(f, " (content-length: {})", len)?;
        }
        for (name, value) in &self.headers {
            write!(f, "\n  {}: {}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub resource: Resource,
    pub response: ResponseMeta,
    pub bytes: usize,
    pub attempts: u32,
    pub path: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum StringsOutcome {
    Fetched(FetchOutcome),
    Failed { reason: String },
}

impl StringsOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, StringsOutcome::Fetched(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub endpoint: Endpoint,
    pub profile: FetchOutcome,
    pub strings: StringsOutcome,
}
