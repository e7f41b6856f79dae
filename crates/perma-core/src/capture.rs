//! Capture format selection.

use crate::link::{ArchiveFormat, Capture};

/// Choose the container format to play back.
///
/// WACZ is served only when `wacz_enabled` is set and a non-empty WACZ capture
/// exists. Otherwise a non-empty WARC capture is served. `None` means there is
/// nothing renderable in either format.
///
/// The toggle is passed per call; callers evaluate it for every request.
pub fn select_format(captures: &[Capture], wacz_enabled: bool) -> Option<ArchiveFormat> {
    let present = |format: ArchiveFormat| {
        captures
            .iter()
            .any(|capture| capture.format == format && capture.is_present())
    };

    if wacz_enabled && present(ArchiveFormat::Wacz) {
        Some(ArchiveFormat::Wacz)
    } else if present(ArchiveFormat::Warc) {
        Some(ArchiveFormat::Warc)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::CaptureRole;

    fn warc(size: u64) -> Capture {
        Capture::new(CaptureRole::Primary, ArchiveFormat::Warc, size)
    }

    fn wacz(size: u64) -> Capture {
        Capture::new(CaptureRole::Primary, ArchiveFormat::Wacz, size)
    }

    #[test]
    fn test_wacz_with_flag_on() {
        let captures = [warc(100), wacz(1)];
        assert_eq!(select_format(&captures, true), Some(ArchiveFormat::Wacz));
    }

    #[test]
    fn test_wacz_with_flag_off_serves_warc() {
        let captures = [warc(100), wacz(1)];
        assert_eq!(select_format(&captures, false), Some(ArchiveFormat::Warc));
    }

    #[test]
    fn test_empty_wacz_with_flag_on_serves_warc() {
        let captures = [warc(100), wacz(0)];
        assert_eq!(select_format(&captures, true), Some(ArchiveFormat::Warc));
    }

    #[test]
    fn test_no_captures() {
        assert_eq!(select_format(&[], true), None);
        assert_eq!(select_format(&[warc(0)], false), None);
    }

    #[test]
    fn test_wacz_only_with_flag_off_is_unrenderable() {
        assert_eq!(select_format(&[wacz(10)], false), None);
    }

    #[test]
    fn test_screenshot_warc_counts_as_warc() {
        let screenshot = Capture::new(CaptureRole::Screenshot, ArchiveFormat::Warc, 10);
        assert_eq!(select_format(&[screenshot], true), Some(ArchiveFormat::Warc));
    }
}
