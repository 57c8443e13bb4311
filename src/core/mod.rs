pub mod decode;
pub mod fetcher;
pub mod http;
pub mod retry;
pub mod shutdown;
pub mod summary;

pub use crate::domain::model::{
    Endpoint, FetchOutcome, FetchedResponse, Resource, ResponseMeta, RunReport, StringsOutcome,
};
pub use crate::domain::ports::{ConfigProvider, StatusPolicy, Storage, Transport};
pub use crate::utils::error::Result;
