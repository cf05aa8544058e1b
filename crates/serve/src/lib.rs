pub mod backend;
pub mod ctx;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod serializer;
pub mod structure;
pub mod types;

use http::StatusCode;
use thiserror::Error;

/// Failures reported by backend collaborators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend error: {0}")]
    Other(String),
}

impl BackendError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        BackendError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("page `{page}` is out of bounds")]
    PageOutOfBounds { page: String },

    #[error("data provider `{0}` is not implemented")]
    FeatureNotImplemented(String),

    #[error("link provider `{0}` not found")]
    LinkProviderNotFound(String),

    #[error("unknown hotspot type `{hotspot_type}` on property `{property}`")]
    UnknownHotspotType {
        property: String,
        hotspot_type: String,
    },

    #[error("max resolve depth {depth} exceeded at property `{property}`")]
    MaxDepthExceeded { depth: usize, property: String },

    #[error("redirect loop at structure `{0}`")]
    RedirectLoop(String),

    #[error("invalid `{content_type}` value: {reason}")]
    InvalidValue {
        content_type: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_value(content_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            content_type: content_type.into(),
            reason: reason.into(),
        }
    }

    pub fn page_out_of_bounds(page: impl ToString) -> Self {
        Error::PageOutOfBounds {
            page: page.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Backend(e) if e.is_not_found())
    }

    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::PageOutOfBounds { .. } => StatusCode::NOT_FOUND,
            Error::Backend(BackendError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Error::FeatureNotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            Error::page_out_of_bounds(0).to_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::from(BackendError::not_found("media", 3)).to_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::FeatureNotImplemented("articles".into()).to_status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            Error::RedirectLoop("x".into()).to_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_is_detected_through_wrapper() {
        let err: Error = BackendError::not_found("account", 1).into();
        assert!(err.is_not_found());
        assert!(!Error::invalid_value("link", "not an object").is_not_found());
    }
}
