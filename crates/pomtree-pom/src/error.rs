use std::path::PathBuf;

/// Malformed manifest bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("manifest is not valid UTF-8: {message}")]
    Utf8 { message: String },

    #[error("failed to parse manifest XML: {message}")]
    Xml { message: String },

    #[error("manifest is missing required element <{element}>")]
    MissingElement { element: &'static str },
}

/// A repository reader failed for a reason other than "not there".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("http fetch failed for {url}: {message}")]
    Http { url: String, message: String },
}
