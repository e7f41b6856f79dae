//! Route definitions for the playback service.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions
//! - `GET /{guid}` - Playback page for an archived link
//!
//! When trusted proxies are configured, every route sits behind the
//! `X-Forwarded-For` validator.

mod health;
mod playback;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::forwarded::validate_proxy_chain;
use crate::state::AppState;

pub use playback::PlaybackQuery;

/// Build the complete playback service router.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/robots.txt", get(robots_txt))
        .route("/{guid}", get(playback::playback_handler));

    if !state.config.trusted_proxies.is_empty() {
        router = router.layer(middleware::from_fn_with_state(
            state.clone(),
            validate_proxy_chain,
        ));
    }

    router.with_state(state)
}

/// Serve robots.txt allowing all crawlers.
async fn robots_txt() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        "User-agent: *\nDisallow:\n",
    )
}
