//! Trusted proxy validation for incoming requests.
//!
//! When trusted proxy whitelists are configured, every request passes through
//! [`validate_proxy_chain`] before routing. Requests whose `X-Forwarded-For`
//! chain does not match the expected proxies are rejected with 400; accepted
//! requests carry their effective client address as a [`ClientIp`] extension.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use perma_core::{Error, effective_client};

use crate::error::PlaybackError;
use crate::state::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Effective client address of a request.
///
/// Set by [`validate_proxy_chain`]. Without the middleware, extraction falls
/// back to the transport peer, and to `None` when that is unknown too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(client) = parts.extensions.get::<ClientIp>() {
            return Ok(*client);
        }
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(ClientIp(peer))
    }
}

/// Reject requests whose forwarding chain does not match the configured proxies.
pub async fn validate_proxy_chain(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, PlaybackError> {
    let Some(ConnectInfo(peer)) = request.extensions().get::<ConnectInfo<SocketAddr>>().copied()
    else {
        tracing::warn!("request has no transport peer address");
        perma_core::metrics::record_proxy_rejection("missing_peer");
        return Err(Error::ProxyChainInvalid("missing transport peer".to_string()).into());
    };

    let forwarded_for = forwarded_for(request.headers());
    let client = effective_client(
        &forwarded_for,
        &peer.ip().to_string(),
        &state.config.trusted_proxies,
    )
    .inspect_err(|err| {
        tracing::warn!(peer = %peer, forwarded_for = %forwarded_for, error = %err, "rejecting proxy chain");
        perma_core::metrics::record_proxy_rejection("invalid_chain");
    })?;

    tracing::Span::current().record("client", tracing::field::display(client));
    tracing::debug!(client = %client, peer = %peer, "accepted proxy chain");

    request.extensions_mut().insert(ClientIp(Some(client)));
    Ok(next.run(request).await)
}

/// All `X-Forwarded-For` values, joined in arrival order.
///
/// Values are decoded lossily so that non-ASCII entries stay in the chain as
/// unparseable hops instead of dropping the whole header line.
fn forwarded_for(headers: &HeaderMap) -> String {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .collect::<Vec<_>>()
        .join(",")
}
