//! Link state resolution.
//!
//! A looked-up record is classified exactly once into a [`LinkState`], and
//! callers branch on that value. The checks run in precedence order
//! `absent > deleted > replaced > private > active`; the first match wins.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::guid;
use crate::link::Link;

/// Maximum number of lookups made while walking a replacement chain.
pub const MAX_REPLACEMENT_HOPS: usize = 8;

/// Visibility state of a requested link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState<'a> {
    /// No record exists for the GUID.
    Absent,
    /// The record was deleted.
    Deleted(&'a Link),
    /// The record points to a replacement link (GUID as stored).
    Replaced {
        link: &'a Link,
        replacement: &'a str,
    },
    /// The record is private and the requester is not an authorized viewer.
    Private(&'a Link),
    /// The record is visible. `private` is set when an authorized viewer sees a private link.
    Active { link: &'a Link, private: bool },
}

impl<'a> LinkState<'a> {
    /// HTTP status associated with this state.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Absent => 404,
            Self::Deleted(_) => 410,
            Self::Replaced { .. } => 302,
            Self::Private(_) => 403,
            Self::Active { .. } => 200,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Deleted(_) => "deleted",
            Self::Replaced { .. } => "replaced",
            Self::Private(_) => "private",
            Self::Active { private: false, .. } => "active",
            Self::Active { private: true, .. } => "active_private",
        }
    }

    /// Convert a terminal state into its error, or return the visible link.
    pub fn into_visible(self, guid: &str) -> Result<(&'a Link, bool)> {
        match self {
            Self::Absent => Err(Error::NotFound(guid.to_string())),
            Self::Deleted(link) => Err(Error::Gone {
                guid: link.guid.clone(),
                reason: link.deletion_reason.clone(),
            }),
            Self::Replaced { link, replacement } => Err(Error::Moved {
                guid: link.guid.clone(),
                replacement: guid::canonical_form(replacement),
            }),
            Self::Private(link) => Err(Error::Forbidden(link.guid.clone())),
            Self::Active { link, private } => Ok((link, private)),
        }
    }
}

/// Classify a looked-up record.
///
/// `can_view` is only consulted for private links that are otherwise visible.
pub fn resolve<'a, F>(record: Option<&'a Link>, can_view: F) -> LinkState<'a>
where
    F: FnOnce(&Link) -> bool,
{
    let Some(link) = record else {
        return LinkState::Absent;
    };

    if link.deleted {
        return LinkState::Deleted(link);
    }

    if let Some(replacement) = link.replacement_link.as_deref() {
        return LinkState::Replaced { link, replacement };
    }

    if link.is_private {
        return if can_view(link) {
            LinkState::Active {
                link,
                private: true,
            }
        } else {
            LinkState::Private(link)
        };
    }

    LinkState::Active {
        link,
        private: false,
    }
}

/// Walk the replacement chain of `guid` and check that it ends.
///
/// `replacement` is the GUID stored on the replaced link. The chain ends at a
/// record without a replacement or at a GUID that has no record. Returns the
/// canonical form of `replacement`, which is where the client is redirected:
/// one hop per request. A deleted record also ends the chain, since deletion
/// takes precedence over replacement in [`resolve`]. Fails with [`Error::ReplacementLoop`] if a GUID
/// repeats or more than [`MAX_REPLACEMENT_HOPS`] lookups are needed.
pub fn check_replacement_chain<F, E>(
    guid: &str,
    replacement: &str,
    mut lookup: F,
) -> std::result::Result<String, E>
where
    F: FnMut(&str) -> std::result::Result<Option<Link>, E>,
    E: From<Error>,
{
    let immediate = guid::canonical_form(replacement);
    let mut seen = HashSet::from([guid::canonical_form(guid)]);
    let mut next = immediate.clone();

    for hops in 1..=MAX_REPLACEMENT_HOPS {
        if !seen.insert(next.clone()) {
            return Err(Error::ReplacementLoop {
                guid: guid.to_string(),
                hops: hops - 1,
            }
            .into());
        }

        let following = lookup(&next)?
            .filter(|record| !record.deleted)
            .and_then(|record| record.replacement_link);
        match following {
            Some(following) => next = guid::canonical_form(&following),
            None => return Ok(immediate),
        }
    }

    Err(Error::ReplacementLoop {
        guid: guid.to_string(),
        hops: MAX_REPLACEMENT_HOPS,
    }
    .into())
}
