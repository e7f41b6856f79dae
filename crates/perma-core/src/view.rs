//! Default view selection.
//!
//! Decides whether a playback page shows the standard render or the
//! screenshot, and whether the URL must first be rewritten with an explicit
//! `?type=` so that it names the view actually shown.

use crate::link::{CaptureRole, Link};

/// A rendered view of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Standard,
    Screenshot,
}

impl View {
    /// Parse the `type` query parameter. Unknown values are ignored.
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(Self::Standard),
            "image" => Some(Self::Screenshot),
            _ => None,
        }
    }

    /// Value of the `type` query parameter naming this view.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Screenshot => "image",
        }
    }

    /// Query string (without `?`) naming this view.
    pub fn query_string(self) -> String {
        format!("type={}", self.query_value())
    }
}

/// Outcome of view selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDecision {
    /// Render this view at the current URL.
    Serve(View),
    /// Redirect to the same path with `?type=` for this view.
    Redirect(View),
    /// Neither a primary capture nor a screenshot exists.
    Unplayable,
}

/// Pick the default view from available artifacts and the link's preference.
pub fn select_default_view(
    has_primary: bool,
    has_screenshot: bool,
    default_to_screenshot: bool,
) -> ViewDecision {
    match (has_primary, has_screenshot, default_to_screenshot) {
        (true, false, false) => ViewDecision::Serve(View::Standard),
        (true, false, true) => ViewDecision::Redirect(View::Standard),
        (false, true, false) => ViewDecision::Redirect(View::Screenshot),
        (false, true, true) => ViewDecision::Serve(View::Screenshot),
        (true, true, false) => ViewDecision::Serve(View::Standard),
        (true, true, true) => ViewDecision::Serve(View::Screenshot),
        (false, false, _) => ViewDecision::Unplayable,
    }
}

/// Pick the view for a request, honouring an explicit `?type=` when possible.
///
/// An explicitly requested view whose artifact exists is served as is. When it
/// does not exist, the default applies, and a default that would be served
/// silently under the wrong `?type=` becomes a redirect instead.
pub fn select_view(link: &Link, requested: Option<View>) -> ViewDecision {
    let has_primary = link.has_capture(CaptureRole::Primary);
    let has_screenshot = link.has_capture(CaptureRole::Screenshot);

    let available = |view: View| match view {
        View::Standard => has_primary,
        View::Screenshot => has_screenshot,
    };

    match requested {
        Some(view) if available(view) => ViewDecision::Serve(view),
        Some(view) => {
            match select_default_view(has_primary, has_screenshot, link.default_to_screenshot_view) {
                ViewDecision::Serve(actual) if actual != view => ViewDecision::Redirect(actual),
                decision => decision,
            }
        }
        None => select_default_view(has_primary, has_screenshot, link.default_to_screenshot_view),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::link::{ArchiveFormat, Capture};

    fn link(primary: bool, screenshot: bool, default_to_screenshot: bool) -> Link {
        let mut link = Link::new("AAAA-AAAA", "https://example.com/", Utc::now());
        link.default_to_screenshot_view = default_to_screenshot;
        if primary {
            link.captures
                .push(Capture::new(CaptureRole::Primary, ArchiveFormat::Warc, 100));
        }
        if screenshot {
            link.captures
                .push(Capture::new(CaptureRole::Screenshot, ArchiveFormat::Warc, 100));
        }
        link
    }

    #[test]
    fn test_default_view_matrix() {
        let cases = [
            (true, false, false, ViewDecision::Serve(View::Standard)),
            (true, false, true, ViewDecision::Redirect(View::Standard)),
            (false, true, false, ViewDecision::Redirect(View::Screenshot)),
            (false, true, true, ViewDecision::Serve(View::Screenshot)),
            (true, true, false, ViewDecision::Serve(View::Standard)),
            (true, true, true, ViewDecision::Serve(View::Screenshot)),
            (false, false, false, ViewDecision::Unplayable),
            (false, false, true, ViewDecision::Unplayable),
        ];

        for (primary, screenshot, preference, expected) in cases {
            assert_eq!(
                select_default_view(primary, screenshot, preference),
                expected,
                "primary={primary} screenshot={screenshot} default_to_screenshot={preference}"
            );
            assert_eq!(
                select_view(&link(primary, screenshot, preference), None),
                expected
            );
        }
    }

    #[test]
    fn test_redirect_query_strings() {
        assert_eq!(View::Standard.query_string(), "type=standard");
        assert_eq!(View::Screenshot.query_string(), "type=image");
    }

    #[test]
    fn test_query_parsing() {
        assert_eq!(View::from_query("image"), Some(View::Screenshot));
        assert_eq!(View::from_query("standard"), Some(View::Standard));
        assert_eq!(View::from_query("screenshot"), None);
        assert_eq!(View::from_query(""), None);
    }

    #[test]
    fn test_explicit_request_served_without_redirect() {
        // The redirect target of the primary-only/prefers-screenshot row.
        let l = link(true, false, true);
        assert_eq!(
            select_view(&l, Some(View::Standard)),
            ViewDecision::Serve(View::Standard)
        );

        let l = link(false, true, false);
        assert_eq!(
            select_view(&l, Some(View::Screenshot)),
            ViewDecision::Serve(View::Screenshot)
        );

        let l = link(true, true, false);
        assert_eq!(
            select_view(&l, Some(View::Screenshot)),
            ViewDecision::Serve(View::Screenshot)
        );
    }

    #[test]
    fn test_explicit_request_for_missing_artifact_redirects() {
        let l = link(true, false, false);
        assert_eq!(
            select_view(&l, Some(View::Screenshot)),
            ViewDecision::Redirect(View::Standard)
        );

        let l = link(false, true, true);
        assert_eq!(
            select_view(&l, Some(View::Standard)),
            ViewDecision::Redirect(View::Screenshot)
        );
    }

    #[test]
    fn test_explicit_request_without_captures_is_unplayable() {
        let l = link(false, false, false);
        assert_eq!(
            select_view(&l, Some(View::Standard)),
            ViewDecision::Unplayable
        );
    }
}
