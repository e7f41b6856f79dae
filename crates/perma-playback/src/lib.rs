//! Perma Playback - HTTP playback of archived links.
//!
//! This crate serves permalinks for archived web pages. Each permalink
//! resolves to a playback page embedding the WARC or WACZ capture, annotated
//! with Memento (RFC 7089) headers so archive-aware clients can navigate
//! between the memento, its original URL and the timegate/timemaps.
//!
//! # Architecture
//!
//! - **Canonicalize**: malformed GUIDs are rejected and non-canonical ones
//!   redirected before any lookup
//! - **Resolve**: the looked-up record is classified once (absent, deleted,
//!   replaced, private, active) by `perma_core`
//! - **Render**: playback and error pages are generated with maud
//! - **Forwarded**: an optional middleware validates `X-Forwarded-For` against
//!   trusted proxy whitelists
//!
//! # URL Pattern
//!
//! ```text
//! GET /{guid}
//! GET /{guid}?type=standard
//! GET /{guid}?type=image
//! ```
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by maud
//! - Content-Security-Policy allows no scripts and frames only the replay host
//! - X-Frame-Options: DENY prevents clickjacking

pub mod auth;
pub mod config;
pub mod error;
pub mod flags;
pub mod forwarded;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
