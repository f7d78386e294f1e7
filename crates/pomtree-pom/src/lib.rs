//! POM manifests for pomtree.
//!
//! This crate owns everything below the resolver:
//! - the raw manifest model ([`RawManifest`], [`Coordinate`], ...)
//! - the descriptor parser ([`parse_manifest`])
//! - repository readers that turn a coordinate into manifest bytes ([`ManifestSource`])

mod error;
mod model;
mod parse;
mod repository;

pub use error::{ParseError, RepositoryError};
pub use model::*;
pub use parse::{parse_manifest, parse_manifest_str};
pub use repository::{
    CompositeRepository, LocalRepository, ManifestSource, MemoryRepository, RemoteRepository,
    DEFAULT_REMOTE_URL,
};
