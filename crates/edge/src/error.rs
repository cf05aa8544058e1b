use adapt::Error as AdaptError;
use serve::Error as ServeError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("adapt error: {0}")]
    AdaptError(#[from] AdaptError),

    #[error("serve error: {0}")]
    ServeError(#[from] ServeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{id}` is a {found}, not a {expected}")]
    WrongKind {
        id: String,
        found: &'static str,
        expected: &'static str,
    },
}
