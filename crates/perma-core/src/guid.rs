//! GUID canonicalization.
//!
//! Two shapes are recognised:
//!
//! - modern: groups of four alphanumerics joined by hyphens (`AB12-CD34`),
//!   canonical in upper case
//! - legacy: 10 or 11 alphanumerics without hyphens (`0J6pkzDeQwT`), which are
//!   case-sensitive and therefore always canonical as given
//!
//! Anything else is rejected before the data store is consulted.

use std::sync::LazyLock;

use regex::Regex;

static MODERN_GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{4}(?:-[A-Za-z0-9]{4})+$").expect("modern GUID regex should compile")
});

static LEGACY_GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{10,11}$").expect("legacy GUID regex should compile")
});

/// Outcome of canonicalizing a raw path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical {
    /// Already canonical; look it up.
    Proceed(String),
    /// Well-formed but not canonical; permanently redirect to this form.
    Redirect(String),
    /// Not a GUID at all.
    NotFound,
}

/// Classify a raw path segment.
pub fn canonicalize(raw: &str) -> Canonical {
    if LEGACY_GUID.is_match(raw) {
        return Canonical::Proceed(raw.to_string());
    }

    if !MODERN_GUID.is_match(raw) {
        return Canonical::NotFound;
    }

    let canonical = raw.to_ascii_uppercase();
    if canonical == raw {
        Canonical::Proceed(canonical)
    } else {
        Canonical::Redirect(canonical)
    }
}

/// Canonical form of a stored GUID, used when building redirect targets.
///
/// Values that are not GUID-shaped are returned unchanged.
pub fn canonical_form(guid: &str) -> String {
    if MODERN_GUID.is_match(guid) {
        guid.to_ascii_uppercase()
    } else {
        guid.to_string()
    }
}

/// Path at which a GUID is served.
pub fn permalink_path(guid: &str) -> String {
    format!("/{}", canonical_form(guid))
}
