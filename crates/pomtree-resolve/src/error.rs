use std::path::PathBuf;

use pomtree_pom::{Coordinate, ParseError, RepositoryError};

/// A failure scoped to one coordinate.
///
/// These never abort a run: the affected subtree is dropped and the error is collected
/// next to the (partial) result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to parse manifest of {coordinate}: {source}")]
    Parse {
        coordinate: Coordinate,
        #[source]
        source: ParseError,
    },

    #[error("manifest of {coordinate} was not found in any repository")]
    NotFound { coordinate: Coordinate },

    #[error("failed to fetch manifest of {coordinate}: {source}")]
    Repository {
        coordinate: Coordinate,
        #[source]
        source: RepositoryError,
    },

    #[error("unable to resolve a version for {group_id}:{artifact_id} (declared in {declared_in})")]
    UnresolvableVersion {
        group_id: String,
        artifact_id: String,
        declared_in: Coordinate,
    },
}

/// Root manifest could not be loaded; nothing can be resolved.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ParseError,
    },
}
