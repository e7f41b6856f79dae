//! Error types for playback resolution.
//!
//! Every variant is a terminal, user-visible outcome decided locally. None of
//! them are retried; failures of the lookup collaborator itself are not part of
//! this taxonomy and surface upstream as generic server errors.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal outcomes of resolving a playback request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The path segment does not have the shape of a GUID. No lookup was made.
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// Well-formed GUID with no matching record.
    #[error("link not found: {0}")]
    NotFound(String),

    /// The link was deleted.
    #[error("link deleted: {guid}")]
    Gone {
        /// GUID of the deleted link.
        guid: String,
        /// Administrative reason, if one was recorded.
        reason: Option<String>,
    },

    /// The link was replaced by another link.
    #[error("link {guid} replaced by {replacement}")]
    Moved {
        /// GUID of the replaced link.
        guid: String,
        /// Canonical GUID of the replacement.
        replacement: String,
    },

    /// The link is private and the requester may not view it.
    #[error("link is private: {0}")]
    Forbidden(String),

    /// The `X-Forwarded-For` chain is too short or contains a non-whitelisted hop.
    #[error("invalid proxy chain: {0}")]
    ProxyChainInvalid(String),

    /// Following replacement links revisits a link or exceeds the hop cap.
    #[error("replacement loop starting at {guid} after {hops} hops")]
    ReplacementLoop {
        /// GUID where the walk started.
        guid: String,
        /// Number of lookups made before giving up.
        hops: usize,
    },
}
