//! Core playback logic for archived links.
//!
//! This crate provides:
//! - GUID canonicalization (case redirects, malformed identifier rejection)
//! - The link state machine (absent, deleted, replaced, private, active)
//! - Capture format (WARC/WACZ) and default view selection
//! - Memento (RFC 7089) header synthesis
//! - Trusted proxy chain validation for `X-Forwarded-For`
//! - Prometheus metrics helpers
//!
//! Everything here is synchronous and free of I/O. Lookups, authorization and
//! feature toggles are supplied by the caller.

pub mod capture;
mod error;
pub mod guid;
pub mod link;
pub mod memento;
pub mod metrics;
pub mod proxy;
pub mod resolve;
pub mod view;

pub use capture::select_format;
pub use error::{Error, Result};
pub use guid::{Canonical, canonicalize};
pub use link::{ArchiveFormat, Capture, CaptureJobStatus, CaptureRole, Link};
pub use memento::{MementoHeaders, http_date, memento_headers};
pub use proxy::{Whitelist, effective_client};
pub use resolve::{LinkState, MAX_REPLACEMENT_HOPS, check_replacement_chain, resolve};
pub use view::{View, ViewDecision, select_default_view, select_view};
