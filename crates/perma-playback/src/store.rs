//! Link lookup backends.
//!
//! Playback only needs one operation: fetch a link (including deleted ones)
//! by its canonical GUID. Records are written by the archiving workflow; this
//! service opens the database read-only.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rusqlite::{Connection, OptionalExtension, params};

use perma_core::{ArchiveFormat, Capture, CaptureJobStatus, CaptureRole, Link};

/// Schema of the link database.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS links (
    guid TEXT PRIMARY KEY,
    submitted_url TEXT NOT NULL,
    creation_timestamp INTEGER NOT NULL,
    is_private INTEGER NOT NULL DEFAULT 0,
    default_to_screenshot_view INTEGER NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    deletion_reason TEXT,
    deleted_at INTEGER,
    replacement_link TEXT,
    created_by INTEGER
);
CREATE TABLE IF NOT EXISTS captures (
    link_guid TEXT NOT NULL REFERENCES links(guid),
    role TEXT NOT NULL,
    format TEXT NOT NULL,
    size INTEGER
);
CREATE INDEX IF NOT EXISTS captures_link_guid ON captures(link_guid);
CREATE TABLE IF NOT EXISTS capture_jobs (
    link_guid TEXT PRIMARY KEY REFERENCES links(guid),
    status TEXT NOT NULL
);
"#;

/// Fetches links by canonical GUID.
pub trait LinkStore: Send + Sync {
    /// Look up a link, deleted or not. `Ok(None)` when no record exists.
    fn get(&self, guid: &str) -> anyhow::Result<Option<Link>>;
}

/// In-memory store, used for tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    links: RwLock<HashMap<String, Link>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a link, keyed by its GUID.
    pub fn insert(&self, link: Link) {
        self.links.write().insert(link.guid.clone(), link);
    }

    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }
}

impl FromIterator<Link> for MemoryLinkStore {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        let store = Self::new();
        for link in iter {
            store.insert(link);
        }
        store
    }
}

impl LinkStore for MemoryLinkStore {
    fn get(&self, guid: &str) -> anyhow::Result<Option<Link>> {
        Ok(self.links.read().get(guid).cloned())
    }
}

/// SQLite-backed store.
pub struct SqliteLinkStore {
    conn: Mutex<Connection>,
}

impl SqliteLinkStore {
    /// Open a link database read-only.
    ///
    /// The file is opened with `immutable=1` so WAL-mode databases can be read
    /// without write access to their `-wal`/`-shm` files.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            immutable_uri(path),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )
        .with_context(|| format!("failed to open link database {}", path.display()))?;

        tracing::info!("Link database connected (immutable): {:?}", path);
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl LinkStore for SqliteLinkStore {
    fn get(&self, guid: &str) -> anyhow::Result<Option<Link>> {
        let conn = self.conn.lock();

        let link = conn
            .query_row(
                "SELECT guid, submitted_url, creation_timestamp, is_private,
                        default_to_screenshot_view, deleted, deletion_reason, deleted_at,
                        replacement_link, created_by
                 FROM links WHERE guid = ?1",
                params![guid],
                |row| {
                    Ok(LinkRow {
                        guid: row.get(0)?,
                        submitted_url: row.get(1)?,
                        creation_timestamp: row.get(2)?,
                        is_private: row.get(3)?,
                        default_to_screenshot_view: row.get(4)?,
                        deleted: row.get(5)?,
                        deletion_reason: row.get(6)?,
                        deleted_at: row.get(7)?,
                        replacement_link: row.get(8)?,
                        created_by: row.get(9)?,
                    })
                },
            )
            .optional()
            .context("link query failed")?;

        let Some(row) = link else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT role, format, size FROM captures WHERE link_guid = ?1")
            .context("capture query failed")?;
        let captures = stmt
            .query_map(params![guid], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })
            .context("capture query failed")?
            .collect::<Result<Vec<_>, _>>()
            .context("capture row decode failed")?
            .into_iter()
            .filter_map(|(role, format, size)| {
                match (CaptureRole::from_name(&role), ArchiveFormat::from_name(&format)) {
                    (Some(role), Some(format)) => Some(Capture {
                        role,
                        format,
                        size: size.and_then(|s| u64::try_from(s).ok()),
                    }),
                    _ => {
                        tracing::warn!(guid = %guid, role = %role, format = %format, "skipping unknown capture");
                        None
                    }
                }
            })
            .collect();

        let job_status: Option<String> = conn
            .query_row(
                "SELECT status FROM capture_jobs WHERE link_guid = ?1",
                params![guid],
                |row| row.get(0),
            )
            .optional()
            .context("capture job query failed")?;
        let capture_job = job_status.and_then(|status| {
            let parsed = CaptureJobStatus::from_name(&status);
            if parsed.is_none() {
                tracing::warn!(guid = %guid, status = %status, "unknown capture job status");
            }
            parsed
        });

        row.into_link(captures, capture_job).map(Some)
    }
}

/// Raw `links` row.
struct LinkRow {
    guid: String,
    submitted_url: String,
    creation_timestamp: i64,
    is_private: bool,
    default_to_screenshot_view: bool,
    deleted: bool,
    deletion_reason: Option<String>,
    deleted_at: Option<i64>,
    replacement_link: Option<String>,
    created_by: Option<i64>,
}

impl LinkRow {
    fn into_link(
        self,
        captures: Vec<Capture>,
        capture_job: Option<CaptureJobStatus>,
    ) -> anyhow::Result<Link> {
        let creation_timestamp = timestamp(self.creation_timestamp)
            .with_context(|| format!("link {} has an invalid creation timestamp", self.guid))?;
        let deleted_at = self.deleted_at.and_then(timestamp);

        Ok(Link {
            guid: self.guid,
            submitted_url: self.submitted_url,
            creation_timestamp,
            is_private: self.is_private,
            default_to_screenshot_view: self.default_to_screenshot_view,
            deleted: self.deleted,
            deletion_reason: self.deletion_reason,
            deleted_at,
            replacement_link: self.replacement_link.filter(|guid| !guid.is_empty()),
            created_by: self.created_by,
            captures,
            capture_job,
        })
    }
}

/// Read-only SQLite URI for `path`.
///
/// Uses the authority-less `file:` form so relative paths are not parsed as
/// a host name.
fn immutable_uri(path: &Path) -> String {
    let path = path
        .to_string_lossy()
        .replace('%', "%25")
        .replace('?', "%3F")
        .replace('#', "%23");
    format!("file:{path}?immutable=1")
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.db");

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            "INSERT INTO links (guid, submitted_url, creation_timestamp, is_private,
                                default_to_screenshot_view, deleted, replacement_link, created_by)
             VALUES ('ABCD-1234', 'https://example.com/', 1709647629, 0, 1, 0, NULL, 42);
             INSERT INTO links (guid, submitted_url, creation_timestamp, deleted,
                                deletion_reason, deleted_at, replacement_link)
             VALUES ('DEAD-0000', 'https://example.org/', 1600000000, 1, 'takedown', 1700000000, '');
             INSERT INTO captures VALUES ('ABCD-1234', 'primary', 'warc', 2048);
             INSERT INTO captures VALUES ('ABCD-1234', 'primary', 'wacz', 1);
             INSERT INTO captures VALUES ('ABCD-1234', 'screenshot', 'warc', NULL);
             INSERT INTO captures VALUES ('ABCD-1234', 'favicon', 'warc', 10);
             INSERT INTO capture_jobs VALUES ('ABCD-1234', 'completed');
             INSERT INTO capture_jobs VALUES ('DEAD-0000', 'exploded');",
        )
        .unwrap();
        drop(conn);

        (dir, path)
    }

    #[test]
    fn test_sqlite_get_full_record() {
        let (_dir, path) = seeded_db();
        let store = SqliteLinkStore::open(&path).unwrap();

        let link = store.get("ABCD-1234").unwrap().unwrap();
        assert_eq!(link.submitted_url, "https://example.com/");
        assert_eq!(link.creation_timestamp.timestamp(), 1709647629);
        assert!(!link.is_private);
        assert!(link.default_to_screenshot_view);
        assert_eq!(link.created_by, Some(42));
        assert_eq!(link.capture_job, Some(CaptureJobStatus::Completed));

        // The unknown "favicon" role is skipped.
        assert_eq!(link.captures.len(), 3);
        assert!(link.has_capture(CaptureRole::Primary));
        assert!(!link.has_capture(CaptureRole::Screenshot));
    }

    #[test]
    fn test_sqlite_deleted_record_is_returned() {
        let (_dir, path) = seeded_db();
        let store = SqliteLinkStore::open(&path).unwrap();

        let link = store.get("DEAD-0000").unwrap().unwrap();
        assert!(link.deleted);
        assert_eq!(link.deletion_reason.as_deref(), Some("takedown"));
        assert_eq!(link.deleted_at.map(|t| t.timestamp()), Some(1700000000));
        assert_eq!(link.replacement_link, None);
        assert_eq!(link.capture_job, None);
        assert!(link.captures.is_empty());
    }

    #[test]
    fn test_sqlite_missing_and_case_sensitive() {
        let (_dir, path) = seeded_db();
        let store = SqliteLinkStore::open(&path).unwrap();

        assert!(store.get("ZZZZ-9999").unwrap().is_none());
        assert!(store.get("abcd-1234").unwrap().is_none());
    }

    #[test]
    fn test_immutable_uri() {
        assert_eq!(
            immutable_uri(Path::new("/var/lib/perma/links.db")),
            "file:/var/lib/perma/links.db?immutable=1"
        );
        assert_eq!(
            immutable_uri(Path::new("data/links.db")),
            "file:data/links.db?immutable=1"
        );
        assert_eq!(
            immutable_uri(Path::new("/tmp/a?b#c%d.db")),
            "file:/tmp/a%3Fb%23c%25d.db?immutable=1"
        );
    }

    #[test]
    fn test_sqlite_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SqliteLinkStore::open(&dir.path().join("nope.db")).is_err());
    }

    #[test]
    fn test_memory_store() {
        let store: MemoryLinkStore = [Link::new("AAAA-AAAA", "https://a.example/", Utc::now())]
            .into_iter()
            .collect();
        assert_eq!(store.len(), 1);
        assert!(store.get("AAAA-AAAA").unwrap().is_some());
        assert!(store.get("BBBB-BBBB").unwrap().is_none());
    }
}
