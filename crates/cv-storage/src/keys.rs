//! Shared key generation for storage backends.
//!
//! Key format: `cv/{id}.{ext}`.

use cv_core::constants::CV_KEY_PREFIX;
use uuid::Uuid;

/// Text after the last `.` of `file_name`, or `""` when there is none.
pub fn file_extension(file_name: &str) -> &str {
    file_name
        .rfind('.')
        .map(|idx| &file_name[idx + 1..])
        .unwrap_or("")
}

/// Generate the storage key for a CV.
///
/// The extension is copied verbatim. A name without a `.` yields `cv/{id}.`
/// (trailing dot, empty extension).
pub fn cv_storage_key(id: Uuid, file_name: &str) -> String {
    format!("{}/{}.{}", CV_KEY_PREFIX, id, file_extension(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_after_last_dot() {
        assert_eq!(file_extension("resume.pdf"), "pdf");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("Resume.PDF"), "PDF");
    }

    #[test]
    fn test_extension_missing_or_empty() {
        assert_eq!(file_extension("doc"), "");
        assert_eq!(file_extension("doc."), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_storage_key_format() {
        let id = Uuid::new_v4();
        assert_eq!(cv_storage_key(id, "resume.pdf"), format!("cv/{}.pdf", id));
        assert_eq!(cv_storage_key(id, "doc"), format!("cv/{}.", id));
        assert_eq!(cv_storage_key(id, ".bashrc"), format!("cv/{}.bashrc", id));
    }
}
