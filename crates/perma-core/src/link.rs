//! Link, capture and capture-job records as seen by playback.
//!
//! Records are loaded by an external store and are read-only here.

use chrono::{DateTime, Utc};

/// Which rendered artifact a capture holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureRole {
    /// The standard page render.
    Primary,
    /// A screenshot of the page.
    Screenshot,
}

impl CaptureRole {
    /// Parse the stored role name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "primary" => Some(Self::Primary),
            "screenshot" => Some(Self::Screenshot),
            _ => None,
        }
    }
}

/// Container format of a stored capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Warc,
    Wacz,
}

impl ArchiveFormat {
    /// Parse the stored format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "warc" => Some(Self::Warc),
            "wacz" => Some(Self::Wacz),
            _ => None,
        }
    }

    /// File extension used by replay sources.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Warc => "warc.gz",
            Self::Wacz => "wacz",
        }
    }
}

/// One rendered artifact of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub role: CaptureRole,
    pub format: ArchiveFormat,
    /// Size in bytes. Zero or `None` means the artifact is not present.
    pub size: Option<u64>,
}

impl Capture {
    pub fn new(role: CaptureRole, format: ArchiveFormat, size: u64) -> Self {
        Self {
            role,
            format,
            size: Some(size),
        }
    }

    /// Whether the artifact actually holds bytes.
    pub fn is_present(&self) -> bool {
        self.size.is_some_and(|size| size > 0)
    }
}

/// State of the asynchronous job that produced a link's captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureJobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Deleted,
}

impl CaptureJobStatus {
    /// Parse the stored status name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Deleted => "deleted",
        }
    }

    /// Whether the job may still produce captures.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

/// An archived link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Canonical GUID.
    pub guid: String,
    /// URL that was archived.
    pub submitted_url: String,
    pub creation_timestamp: DateTime<Utc>,
    pub is_private: bool,
    pub default_to_screenshot_view: bool,
    pub deleted: bool,
    pub deletion_reason: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// GUID of the link that supersedes this one. A lookup key, never an owned record.
    pub replacement_link: Option<String>,
    /// User that created the link, if known.
    pub created_by: Option<i64>,
    pub captures: Vec<Capture>,
    pub capture_job: Option<CaptureJobStatus>,
}

impl Link {
    /// A visible link with no captures.
    pub fn new(
        guid: impl Into<String>,
        submitted_url: impl Into<String>,
        creation_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            guid: guid.into(),
            submitted_url: submitted_url.into(),
            creation_timestamp,
            is_private: false,
            default_to_screenshot_view: false,
            deleted: false,
            deletion_reason: None,
            deleted_at: None,
            replacement_link: None,
            created_by: None,
            captures: Vec::new(),
            capture_job: None,
        }
    }

    /// Whether a non-empty capture with the given role exists.
    pub fn has_capture(&self, role: CaptureRole) -> bool {
        self.captures
            .iter()
            .any(|capture| capture.role == role && capture.is_present())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> Link {
        Link::new("AAAA-AAAA", "https://example.com/", Utc::now())
    }

    #[test]
    fn test_zero_size_capture_not_present() {
        let capture = Capture::new(CaptureRole::Primary, ArchiveFormat::Warc, 0);
        assert!(!capture.is_present());

        let capture = Capture {
            role: CaptureRole::Primary,
            format: ArchiveFormat::Warc,
            size: None,
        };
        assert!(!capture.is_present());
    }

    #[test]
    fn test_has_capture_by_role() {
        let mut link = link();
        assert!(!link.has_capture(CaptureRole::Primary));

        link.captures
            .push(Capture::new(CaptureRole::Screenshot, ArchiveFormat::Warc, 10));
        assert!(link.has_capture(CaptureRole::Screenshot));
        assert!(!link.has_capture(CaptureRole::Primary));
    }

    #[test]
    fn test_names_parse() {
        assert_eq!(CaptureRole::from_name("primary"), Some(CaptureRole::Primary));
        assert_eq!(ArchiveFormat::from_name("wacz"), Some(ArchiveFormat::Wacz));
        assert_eq!(
            CaptureJobStatus::from_name("in_progress"),
            Some(CaptureJobStatus::InProgress)
        );
        assert_eq!(CaptureJobStatus::from_name("bogus"), None);
    }

    #[test]
    fn test_job_running() {
        assert!(CaptureJobStatus::Pending.is_running());
        assert!(CaptureJobStatus::InProgress.is_running());
        assert!(!CaptureJobStatus::Failed.is_running());
        assert!(!CaptureJobStatus::Completed.is_running());
    }
}
