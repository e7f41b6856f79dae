//! HTML rendering for playback pages.
//!
//! All rendering uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation with automatic escaping of dynamic values.

pub mod components;

use maud::{Markup, html};
use perma_core::{ArchiveFormat, CaptureJobStatus, CaptureRole, Link, View};

use components::{page_shell, record_header};

/// Everything the playback page needs besides the link itself.
#[derive(Debug, Clone, Copy)]
pub struct Playback<'a> {
    pub view: View,
    pub format: ArchiveFormat,
    /// Prefix of replay sources, without trailing slash.
    pub replay_base_url: &'a str,
    /// An authorized viewer is looking at a private link.
    pub private: bool,
}

/// URL of the archive the playback iframe loads.
pub fn replay_source(replay_base_url: &str, guid: &str, format: ArchiveFormat, view: View) -> String {
    format!(
        "{replay_base_url}/{guid}.{}?{}",
        format.extension(),
        view.query_string()
    )
}

/// Render the playback page for a visible link.
pub fn playback_page(link: &Link, playback: Playback<'_>) -> Markup {
    let source = replay_source(
        playback.replay_base_url,
        &link.guid,
        playback.format,
        playback.view,
    );
    let title = format!("{} | Archived {}", link.submitted_url, link.guid);

    let body = html! {
        (record_header(
            &link.guid,
            &link.submitted_url,
            &link.creation_timestamp,
            view_switch(link, playback.view),
        ))
        @if playback.private {
            div class="private-banner" { "This record is private and only visible to you." }
        }
        iframe class="replay" src=(source) title=(format!("Archived copy of {}", link.submitted_url)) {}
    };

    page_shell(&title, body)
}

/// Render the page for a visible link with nothing to play back.
pub fn unplayable_page(link: &Link, private: bool) -> Markup {
    let (heading, message) = unplayable_message(link.capture_job);
    let title = format!("{} | Archived {}", link.submitted_url, link.guid);

    let body = html! {
        (record_header(&link.guid, &link.submitted_url, &link.creation_timestamp, None))
        @if private {
            div class="private-banner" { "This record is private and only visible to you." }
        }
        main class="notice" {
            h1 { (heading) }
            p { (message) }
        }
    };

    page_shell(&title, body)
}

/// Heading and message shown when a link has no playable capture.
pub fn unplayable_message(job: Option<CaptureJobStatus>) -> (&'static str, &'static str) {
    match job {
        Some(status) if status.is_running() => (
            "Capture in progress",
            "This link is still being archived. Check back in a few minutes.",
        ),
        Some(CaptureJobStatus::Failed) => (
            "Capture failed",
            "We were unable to archive this link. A screenshot or other record may not be available.",
        ),
        _ => (
            "Nothing to play back",
            "No playable capture is available for this link.",
        ),
    }
}

/// Link to the other view, when the link has that artifact.
fn view_switch(link: &Link, current: View) -> Option<Markup> {
    let (other, label) = match current {
        View::Standard => (View::Screenshot, "View screenshot"),
        View::Screenshot => (View::Standard, "View capture"),
    };
    let role = match other {
        View::Standard => CaptureRole::Primary,
        View::Screenshot => CaptureRole::Screenshot,
    };

    link.has_capture(role).then(|| {
        html! {
            a class="view-switch" href={ "/" (link.guid) "?" (other.query_string()) } { (label) }
        }
    })
}
