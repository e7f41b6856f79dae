//! Requesting principals and private-link authorization.
//!
//! A principal is identified by a Bearer token:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! Tokens are mapped to users in `PERMA_API_TOKENS`. Requests without a known
//! token are anonymous; playback never rejects them outright, it only limits
//! which links they can see.

use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use perma_core::Link;

/// The identity a request is made with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Principal {
    /// Authenticated user, `None` for anonymous requests.
    pub user_id: Option<i64>,
    pub is_staff: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i64, is_staff: bool) -> Self {
        Self {
            user_id: Some(user_id),
            is_staff,
        }
    }

    /// Identify the principal behind a request's `Authorization` header.
    pub fn from_headers(headers: &HeaderMap, tokens: &HashMap<String, Principal>) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token {
            Some(token) => match tokens.get(token.trim()) {
                Some(principal) => *principal,
                None => {
                    tracing::debug!("unknown api token, treating request as anonymous");
                    Self::anonymous()
                }
            },
            None => Self::anonymous(),
        }
    }
}

/// Decides whether a principal may view a private link.
pub trait Authorizer: Send + Sync {
    fn can_view(&self, principal: &Principal, link: &Link) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&Principal, &Link) -> bool + Send + Sync,
{
    fn can_view(&self, principal: &Principal, link: &Link) -> bool {
        self(principal, link)
    }
}

/// Staff may view every link; users may view the links they created.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffOrCreator;

impl Authorizer for StaffOrCreator {
    fn can_view(&self, principal: &Principal, link: &Link) -> bool {
        if principal.is_staff {
            return true;
        }
        matches!(
            (principal.user_id, link.created_by),
            (Some(user), Some(creator)) if user == creator
        )
    }
}
