use thiserror::Error;

use shared::{domain::DocumentId, error::ApiErrorBody};

/// Failure of a call to the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service error ({status}): {reason}")]
    Service { status: u16, reason: String },
}

impl RemoteError {
    /// Builds a service error from a non-2xx response, preferring the
    /// `{detail}` body over the generic fallback reason.
    pub(crate) async fn from_response(response: reqwest::Response, fallback: &str) -> Self {
        let status = response.status().as_u16();
        let reason = match response.json::<ApiErrorBody>().await {
            Ok(body) if !body.detail.trim().is_empty() => body.detail,
            _ => fallback.to_string(),
        };
        Self::Service { status, reason }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("document {0} is already registered")]
    DuplicateId(DocumentId),
    #[error("document {0} not found")]
    NotFound(DocumentId),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type {extension:?}; allowed: .pdf, .txt, .md, .markdown")]
    UnsupportedType { extension: String },
    #[error("an upload is already in flight")]
    UploadInFlight,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("question must not be blank")]
    BlankQuestion,
    #[error("no ready documents to query")]
    NoReadyDocuments,
    #[error("a question is already awaiting its answer")]
    QueryInFlight,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("document {0} not found")]
    NotFound(DocumentId),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
