//! Shared HTML components used across playback pages.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages.

use chrono::{DateTime, Utc};
use maud::{Markup, PreEscaped, html};

/// Inline CSS for playback pages.
///
/// The archived page fills the viewport below a compact header bar.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fafafa;--fg:#111;--fg2:#555;--fg3:#999;--accent:#dd671a;--accent-hover:#b9540f;--surface:#fff;--border:rgba(0,0,0,.1);--warn:#fff4d6;--mono:"SF Mono",SFMono-Regular,ui-monospace,Menlo,monospace}
html,body{height:100%}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.5;color:var(--fg);background:var(--bg);display:flex;flex-direction:column}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}

.record-header{display:flex;align-items:center;justify-content:space-between;gap:1rem;padding:.6rem 1rem;background:var(--surface);border-bottom:1px solid var(--border);font-size:.9rem}
.record-meta{min-width:0;display:flex;flex-direction:column}
.record-url{font-weight:600;white-space:nowrap;overflow:hidden;text-overflow:ellipsis}
.record-date{color:var(--fg3);font-size:.8rem}
.record-guid{font-family:var(--mono);color:var(--fg2);font-size:.8rem}
.view-switch{white-space:nowrap;padding:.3rem .8rem;border:1px solid var(--border);border-radius:6px}

.private-banner{padding:.5rem 1rem;background:var(--warn);font-size:.85rem;text-align:center}

.replay{flex:1;width:100%;border:none;background:#fff}

.notice{max-width:560px;margin:3rem auto;padding:0 1rem;text-align:center}
.notice h1{font-size:1.4rem;margin-bottom:.75rem}
.notice p{color:var(--fg2)}

@media(prefers-color-scheme:dark){
:root{--bg:#0f0f14;--fg:#e5e5e5;--fg2:#a0a0a0;--fg3:#666;--accent:#f08a3e;--accent-hover:#f5a66b;--surface:#17171f;--border:rgba(255,255,255,.12);--warn:#3a2f12}
}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#fafafa;color:#1a1a2e;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
@media(prefers-color-scheme:dark){
body{background:#0f0f17;color:#e0e0e8}
.error-page p{color:#aaa}
}
"#;

/// Content-Security-Policy header value for a page framing `replay_base_url`.
///
/// Inline styles only, no scripts. Frames are limited to the replay host prefix.
pub fn csp_header(replay_base_url: &str) -> String {
    format!(
        "default-src 'none'; style-src 'unsafe-inline'; img-src 'self' data:; frame-src {replay_base_url}/; form-action 'none'; frame-ancestors 'none'"
    )
}

/// Render the full HTML page shell with `<head>` and body content.
pub fn page_shell(title: &str, body_content: Markup) -> Markup {
    html! {
        (maud::DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="robots" content="noindex";
                style { (PreEscaped(PAGE_CSS)) }
            }
            body { (body_content) }
        }
    }
}

/// Render a minimal error page.
pub fn error_page(title: &str, message: &str) -> Markup {
    html! {
        (maud::DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="robots" content="noindex";
                style { (PreEscaped(ERROR_CSS)) }
            }
            body {
                main class="error-page" {
                    h1 { (title) }
                    p { (message) }
                }
            }
        }
    }
}

/// Header bar naming the archived URL, its capture date and GUID.
pub fn record_header(
    guid: &str,
    submitted_url: &str,
    captured_at: &DateTime<Utc>,
    switch: Option<Markup>,
) -> Markup {
    html! {
        header class="record-header" {
            div class="record-meta" {
                span class="record-url" title=(submitted_url) { (truncate(submitted_url, 120)) }
                span class="record-date" {
                    "Captured "
                    time datetime=(captured_at.to_rfc3339()) { (format_capture_date(captured_at)) }
                    " · "
                    span class="record-guid" { (guid) }
                }
            }
            @if let Some(switch) = switch {
                (switch)
            }
        }
    }
}

/// Format a capture timestamp as "March 5, 2024 14:07 UTC".
pub fn format_capture_date(instant: &DateTime<Utc>) -> String {
    instant.format("%B %-d, %Y %H:%M UTC").to_string()
}

/// Truncate a string to a maximum character count, adding an ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_len).collect();
    out.push('…');
    out
}
