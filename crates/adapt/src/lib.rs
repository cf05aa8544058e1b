//! In-memory collaborators for the resolvers in `serve`.
//!
//! Everything is backed by a JSON fixture; see [`fixture::Fixture`].

pub mod bootstrap;
pub mod fixture;
pub mod link;
pub mod markup;
pub mod provider;
pub mod store;

use serve::{BackendError, Error as ServeError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serve error: {0}")]
    ServeError(#[from] ServeError),

    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid fixture: {0}")]
    Fixture(String),

    #[error("markup error: {0}")]
    Markup(String),
}

impl Error {
    #[inline]
    pub fn fixture(msg: impl Into<String>) -> Self {
        Error::Fixture(msg.into())
    }

    #[inline]
    pub fn markup(msg: impl Into<String>) -> Self {
        Error::Markup(msg.into())
    }
}

/// Backend traits only know [`BackendError`].
impl From<Error> for BackendError {
    fn from(err: Error) -> Self {
        BackendError::Other(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
