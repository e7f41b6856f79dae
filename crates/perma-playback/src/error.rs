//! Error types for the playback service.
//!
//! Errors are rendered as simple HTML error pages rather than JSON,
//! since this is a user-facing HTML service.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use perma_core::Error;

use crate::render::components::error_page;

/// Playback service error type.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// A terminal playback outcome.
    #[error(transparent)]
    Playback(#[from] Error),

    /// Internal server error (link store, response building).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for PlaybackError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            Self::Playback(Error::MalformedIdentifier(_) | Error::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "No record exists at this address.",
            ),
            Self::Playback(Error::Gone { .. }) => (
                StatusCode::GONE,
                "Record Deleted",
                "This record has been deleted.",
            ),
            Self::Playback(Error::Forbidden(_)) => (
                StatusCode::FORBIDDEN,
                "Private Record",
                "This record is private.",
            ),
            Self::Playback(Error::Moved { replacement, .. }) => {
                return found(&format!("/{replacement}"));
            }
            Self::Playback(Error::ProxyChainInvalid(_)) => {
                return (StatusCode::BAD_REQUEST, "Bad Request: invalid proxy chain\n")
                    .into_response();
            }
            Self::Playback(err @ Error::ReplacementLoop { .. }) => {
                tracing::error!(error = %err, "replacement chain does not terminate");
                (
                    StatusCode::LOOP_DETECTED,
                    "Redirect Loop",
                    "This record's replacement links form a loop.",
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "An internal error occurred. Please try again later.",
                )
            }
        };

        (status, error_page(title, message)).into_response()
    }
}

/// 302 Found to a local path.
pub fn found(location: &str) -> Response {
    redirect(StatusCode::FOUND, location)
}

/// 301 Moved Permanently to a local path.
pub fn moved_permanently(location: &str) -> Response {
    redirect(StatusCode::MOVED_PERMANENTLY, location)
}

fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(err) => {
            tracing::error!(location = %location, error = %err, "invalid redirect location");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
