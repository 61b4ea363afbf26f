use thiserror::Error;

/// Why an upload did not produce a run identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("no files selected")]
    EmptySelection,
    #[error("could not read {name}: {message}")]
    FileUnreadable { name: String, message: String },
    #[error("{0}")]
    Network(String),
    #[error("{status} {status_text}")]
    Rejected { status: u16, status_text: String },
    /// The service answered with an `error` field instead of a run.
    #[error("{0}")]
    ServiceError(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
