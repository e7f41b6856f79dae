//! Memento (RFC 7089) response headers.
//!
//! The `Link` header layout is relied on byte-for-byte by Memento-aware
//! clients:
//!
//! ```text
//! <{url}>; rel="original", <{O}/timegate/{url}>; rel="timegate", ...
//! ```

use chrono::{DateTime, Utc};

use crate::link::Link;

/// Name of the memento datetime header.
pub const MEMENTO_DATETIME: &str = "memento-datetime";

/// Headers attached to a visible memento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MementoHeaders {
    /// Value of `Memento-Datetime`.
    pub datetime: String,
    /// Value of `Link`.
    pub link: String,
}

/// Format an instant as an HTTP-date (IMF-fixdate).
pub fn http_date(instant: &DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build the Memento headers for `link` served from `origin`.
///
/// `origin` is the scheme and host of this server without a trailing slash.
pub fn memento_headers(origin: &str, link: &Link) -> MementoHeaders {
    let datetime = http_date(&link.creation_timestamp);
    let url = escape_uri(&link.submitted_url);
    let origin = origin.trim_end_matches('/');

    let entries = [
        format!("<{url}>; rel=\"original\""),
        format!("<{origin}/timegate/{url}>; rel=\"timegate\""),
        format!(
            "<{origin}/timemap/link/{url}>; rel=\"timemap\"; type=\"application/link-format\""
        ),
        format!("<{origin}/timemap/json/{url}>; rel=\"timemap\"; type=\"application/json\""),
        format!("<{origin}/timemap/html/{url}>; rel=\"timemap\"; type=\"text/html\""),
        format!(
            "<{origin}/{guid}>; rel=\"memento\"; datetime=\"{datetime}\"",
            guid = link.guid
        ),
    ];

    MementoHeaders {
        link: entries.join(", "),
        datetime,
    }
}

/// Percent-encode bytes that cannot appear inside `<...>` in a header value.
///
/// Visible ASCII other than `<`, `>` and `"` passes through unchanged.
fn escape_uri(uri: &str) -> String {
    let mut out = String::with_capacity(uri.len());
    for byte in uri.bytes() {
        match byte {
            b'<' | b'>' | b'"' => out.push_str(&format!("%{byte:02X}")),
            0x21..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn link() -> Link {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        Link::new("ABCD-1234", "https://example.com/page?q=1", created)
    }

    #[test]
    fn test_http_date_format() {
        let instant = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(&instant), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_memento_datetime() {
        let headers = memento_headers("https://perma.test", &link());
        assert_eq!(headers.datetime, "Tue, 05 Mar 2024 14:07:09 GMT");
    }

    #[test]
    fn test_link_header_exact() {
        let headers = memento_headers("https://perma.test", &link());
        let expected = concat!(
            "<https://example.com/page?q=1>; rel=\"original\", ",
            "<https://perma.test/timegate/https://example.com/page?q=1>; rel=\"timegate\", ",
            "<https://perma.test/timemap/link/https://example.com/page?q=1>; rel=\"timemap\"; type=\"application/link-format\", ",
            "<https://perma.test/timemap/json/https://example.com/page?q=1>; rel=\"timemap\"; type=\"application/json\", ",
            "<https://perma.test/timemap/html/https://example.com/page?q=1>; rel=\"timemap\"; type=\"text/html\", ",
            "<https://perma.test/ABCD-1234>; rel=\"memento\"; datetime=\"Tue, 05 Mar 2024 14:07:09 GMT\"",
        );
        assert_eq!(headers.link, expected);
    }

    #[test]
    fn test_link_header_has_six_entries_in_order() {
        let headers = memento_headers("https://perma.test", &link());
        let rels: Vec<&str> = headers
            .link
            .split(", <")
            .map(|entry| {
                let start = entry.find("rel=\"").unwrap() + 5;
                let end = entry[start..].find('"').unwrap() + start;
                &entry[start..end]
            })
            .collect();
        assert_eq!(
            rels,
            ["original", "timegate", "timemap", "timemap", "timemap", "memento"]
        );
    }

    #[test]
    fn test_trailing_slash_on_origin_ignored() {
        let with_slash = memento_headers("https://perma.test/", &link());
        let without = memento_headers("https://perma.test", &link());
        assert_eq!(with_slash, without);
    }

    #[test]
    fn test_non_ascii_url_is_escaped() {
        let mut link = link();
        link.submitted_url = "https://example.com/caf\u{e9} <x>".to_string();
        let headers = memento_headers("https://perma.test", &link);
        assert!(
            headers
                .link
                .starts_with("<https://example.com/caf%C3%A9%20%3Cx%3E>; rel=\"original\"")
        );
        assert!(headers.link.is_ascii());
    }
}
