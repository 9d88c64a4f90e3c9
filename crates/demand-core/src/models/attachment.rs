//! Attachment model and the bounded attachment list

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result, ValidationError};

/// Maximum number of files attached to one demand.
pub const MAX_ATTACHMENTS: usize = 4;

/// Maximum size of a single attachment (40 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 40 * 1024 * 1024;

/// A file selected for upload. The bytes are passed through unmodified.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name, sent as the attachment name.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create an attachment from in-memory bytes.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into().trim().to_string();
        if file_name.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment file name cannot be empty".to_string(),
            ));
        }
        Ok(Self { file_name, bytes })
    }

    /// Read an attachment from disk.
    ///
    /// The size bound is checked against file metadata before the contents
    /// are read, so oversized files are never loaded.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("Not a file path: {}", path.display()))
            })?
            .to_string();

        let size_bytes = std::fs::metadata(path)?.len();
        if size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(ValidationError::AttachmentTooLarge {
                file_name,
                max_bytes: MAX_ATTACHMENT_BYTES,
            }
            .into());
        }

        Self::new(file_name, std::fs::read(path)?)
    }

    /// Size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// Ordered list of attachments, bounded in count and per-file size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    files: Vec<Attachment>,
}

impl AttachmentSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Append a batch of files.
    ///
    /// The whole batch is rejected, leaving the set untouched, when it would
    /// exceed [`MAX_ATTACHMENTS`] or when any file exceeds
    /// [`MAX_ATTACHMENT_BYTES`].
    pub fn add(&mut self, batch: Vec<Attachment>) -> std::result::Result<(), ValidationError> {
        if self.files.len() + batch.len() > MAX_ATTACHMENTS {
            return Err(ValidationError::TooManyAttachments {
                max: MAX_ATTACHMENTS,
            });
        }

        if let Some(oversized) = batch
            .iter()
            .find(|file| file.size_bytes() > MAX_ATTACHMENT_BYTES)
        {
            return Err(ValidationError::AttachmentTooLarge {
                file_name: oversized.file_name.clone(),
                max_bytes: MAX_ATTACHMENT_BYTES,
            });
        }

        self.files.extend(batch);
        Ok(())
    }

    /// Remove the file at `index`. Out-of-range positions are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attachment> {
        self.files.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Attachment] {
        &self.files
    }
}

impl<'a> IntoIterator for &'a AttachmentSet {
    type Item = &'a Attachment;
    type IntoIter = std::slice::Iter<'a, Attachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(name: &str, size: usize) -> Attachment {
        Attachment::new(name, vec![0; size]).unwrap()
    }

    #[test]
    fn add_appends_in_order() {
        let mut set = AttachmentSet::new();
        set.add(vec![file("a.png", 1), file("b.pdf", 2)]).unwrap();
        set.add(vec![file("c.txt", 3)]).unwrap();

        let names: Vec<&str> = set.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.pdf", "c.txt"]);
    }

    #[test]
    fn over_limit_batch_is_rejected_whole() {
        let mut set = AttachmentSet::new();
        set.add(vec![file("a", 1), file("b", 1), file("c", 1)]).unwrap();

        let error = set.add(vec![file("d", 1), file("e", 1)]).unwrap_err();
        assert_eq!(error, ValidationError::TooManyAttachments { max: 4 });
        assert_eq!(set.len(), 3);

        set.add(vec![file("d", 1)]).unwrap();
        assert_eq!(set.len(), MAX_ATTACHMENTS);
        assert!(set.add(vec![file("e", 1)]).is_err());
        assert_eq!(set.len(), MAX_ATTACHMENTS);
    }

    #[test]
    fn oversized_file_rejects_batch() {
        let mut set = AttachmentSet::new();
        set.add(vec![file("keep", 1)]).unwrap();
        let before = set.clone();

        let too_big = MAX_ATTACHMENT_BYTES as usize + 1;
        let error = set
            .add(vec![file("small", 10), file("huge.mov", too_big)])
            .unwrap_err();
        assert_eq!(
            error,
            ValidationError::AttachmentTooLarge {
                file_name: "huge.mov".to_string(),
                max_bytes: MAX_ATTACHMENT_BYTES,
            }
        );
        assert_eq!(set, before);
    }

    #[test]
    fn file_at_exact_limit_is_accepted() {
        let mut set = AttachmentSet::new();
        set.add(vec![file("edge.bin", MAX_ATTACHMENT_BYTES as usize)])
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_by_position() {
        let mut set = AttachmentSet::new();
        set.add(vec![file("a", 1), file("b", 1), file("c", 1)]).unwrap();

        let removed = set.remove(1).unwrap();
        assert_eq!(removed.file_name, "b");
        assert_eq!(set.remove(9), None);

        let names: Vec<&str> = set.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn attachment_requires_name() {
        assert!(Attachment::new("  ", vec![1]).is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.txt");
        std::fs::write(&path, b"hello").unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.file_name, "brief.txt");
        assert_eq!(attachment.bytes, b"hello".to_vec());
    }
}
