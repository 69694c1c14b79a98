use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document decode error for {document_id}: {details}")]
    DocumentDecode {
        document_id: String,
        details: String,
    },

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("unknown document: {0}")]
    UnknownDocument(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not persist snapshot to {path}: {details}")]
    Persist { path: String, details: String },

    #[error("snapshot at {path} is unreadable: {details}")]
    CorruptSnapshot { path: String, details: String },

    #[error("unknown document: {0}")]
    UnknownDocument(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
