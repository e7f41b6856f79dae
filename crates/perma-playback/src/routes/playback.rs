//! Permalink playback handler.
//!
//! Handles `GET /{guid}`, optionally with `?type=standard|image`.

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use maud::Markup;
use perma_core::guid::permalink_path;
use perma_core::memento::MEMENTO_DATETIME;
use perma_core::metrics::record_playback;
use perma_core::{
    Canonical, CaptureJobStatus, Error, Link, LinkState, MementoHeaders, View, ViewDecision, canonicalize,
    check_replacement_chain, memento_headers, resolve, select_format, select_view,
};
use serde::Deserialize;

use crate::auth::Principal;
use crate::error::{PlaybackError, found, moved_permanently};
use crate::flags::WACZ_PLAYBACK;
use crate::forwarded::ClientIp;
use crate::render::{self, Playback};
use crate::state::AppState;

/// Query parameters accepted on a permalink.
#[derive(Debug, Default, Deserialize)]
pub struct PlaybackQuery {
    /// Requested view: `standard` or `image`. Other values are ignored.
    #[serde(rename = "type")]
    pub view: Option<String>,
}

/// Handle a permalink request.
///
/// 1. Canonicalizes the GUID (malformed → 404, wrong case → 301), before any lookup
/// 2. Looks the link up and classifies it once into a [`LinkState`]
/// 3. Follows replacements with a one-hop 302 after checking the chain ends
/// 4. Picks the view and capture format for visible links
/// 5. Renders the playback page with Memento headers
pub async fn playback_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(query): Query<PlaybackQuery>,
    ClientIp(client): ClientIp,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, PlaybackError> {
    let guid = match canonicalize(&raw) {
        Canonical::Proceed(guid) => guid,
        Canonical::Redirect(canonical) => {
            record_playback("case_redirect");
            let mut location = permalink_path(&canonical);
            if let Some(query) = uri.query() {
                location.push('?');
                location.push_str(query);
            }
            return Ok(moved_permanently(&location));
        }
        Canonical::NotFound => {
            record_playback("malformed");
            return Err(Error::MalformedIdentifier(raw).into());
        }
    };

    let principal = Principal::from_headers(&headers, &state.config.api_tokens);
    let record = lookup(&state, &guid)?;
    let link_state = resolve(record.as_ref(), |link| {
        state.authorizer.can_view(&principal, link)
    });

    record_playback(link_state.label());
    tracing::debug!(
        guid = %guid,
        outcome = link_state.label(),
        client = ?client,
        user = ?principal.user_id,
        "resolved permalink"
    );

    if let LinkState::Replaced { replacement, .. } = link_state {
        let target =
            check_replacement_chain(&guid, replacement, |next: &str| lookup(&state, next))?;
        return Ok(found(&permalink_path(&target)));
    }

    let (link, private) = link_state.into_visible(&guid)?;
    let memento = memento_headers(&state.config.base_url, link);
    let requested = query.view.as_deref().and_then(View::from_query);

    let markup = match select_view(link, requested) {
        ViewDecision::Redirect(view) => {
            return Ok(found(&format!(
                "{}?{}",
                permalink_path(&link.guid),
                view.query_string()
            )));
        }
        ViewDecision::Serve(view) => {
            let wacz_enabled = state.flags.is_active(WACZ_PLAYBACK, &principal);
            match select_format(&link.captures, wacz_enabled) {
                Some(format) => render::playback_page(
                    link,
                    Playback {
                        view,
                        format,
                        replay_base_url: &state.config.replay_base_url,
                        private,
                    },
                ),
                None => unplayable(link, private),
            }
        }
        ViewDecision::Unplayable => unplayable(link, private),
    };

    build_response(&state, markup, &memento, private)
}

fn lookup(state: &AppState, guid: &str) -> Result<Option<Link>, PlaybackError> {
    let record = state
        .store
        .get(guid)
        .with_context(|| format!("link lookup failed for {guid}"))?;
    Ok(record)
}

fn unplayable(link: &Link, private: bool) -> Markup {
    tracing::debug!(
        guid = %link.guid,
        job = link.capture_job.map_or("none", CaptureJobStatus::as_str),
        "no playable capture"
    );
    render::unplayable_page(link, private)
}

/// Build a 200 HTML response with Memento and security headers.
fn build_response(
    state: &AppState,
    markup: Markup,
    memento: &MementoHeaders,
    private: bool,
) -> Result<Response, PlaybackError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    // Memento (RFC 7089)
    headers.insert(
        HeaderName::from_static(MEMENTO_DATETIME),
        HeaderValue::from_str(&memento.datetime).context("invalid Memento-Datetime value")?,
    );
    headers.insert(
        header::LINK,
        HeaderValue::from_str(&memento.link).context("invalid Link header value")?,
    );

    // Security headers
    let csp = render::components::csp_header(&state.config.replay_base_url);
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_str(&csp).context("invalid Content-Security-Policy value")?,
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );

    if private {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("private, no-store"),
        );
    }

    Ok((StatusCode::OK, headers, markup.into_string()).into_response())
}
