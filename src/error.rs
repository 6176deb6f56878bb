use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single remote request.
///
/// Only the catalog fetch treats this as fatal; every other resource turns it
/// into a [`crate::model::Fetched::Failed`] entry in the context.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("invalid json from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
