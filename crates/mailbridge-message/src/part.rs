//! Child parts of a message: attachments, embedded images and other
//! body parts.

use crate::content_type::ContentType;
use crate::error::Result;
use bytes::Bytes;
use std::path::Path;

/// How a child part is attached to its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// A file attached with `attachment` disposition.
    Attachment,
    /// An image embedded in the HTML body.
    Image,
    /// Any other child part, e.g. an alternative body.
    Inline,
}

/// A child part of a [`Message`](crate::Message).
#[derive(Debug, Clone)]
pub struct Part {
    kind: PartKind,
    body: Bytes,
    filename: Option<String>,
    content_type: ContentType,
}

impl Part {
    /// Creates a file attachment.
    #[must_use]
    pub fn attachment(
        body: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            kind: PartKind::Attachment,
            body: body.into(),
            filename: Some(filename.into()),
            content_type,
        }
    }

    /// Creates an embedded image.
    #[must_use]
    pub fn image(
        body: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            kind: PartKind::Image,
            body: body.into(),
            filename: Some(filename.into()),
            content_type,
        }
    }

    /// Creates a non-attachment child part.
    #[must_use]
    pub fn inline(body: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            kind: PartKind::Inline,
            body: body.into(),
            filename: None,
            content_type,
        }
    }

    /// Reads a file into an attachment, guessing the content type from
    /// its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn attachment_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read(path)?;

        let filename = path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |name| name.to_string_lossy().into_owned());

        Ok(Self::attachment(body, filename, ContentType::from_path(path)))
    }

    /// Returns the part kind.
    #[must_use]
    pub const fn kind(&self) -> PartKind {
        self.kind
    }

    /// Returns the raw body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the filename, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// True for file attachments and embedded images.
    #[must_use]
    pub const fn is_attachment(&self) -> bool {
        matches!(self.kind, PartKind::Attachment | PartKind::Image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_classification() {
        let file = Part::attachment(&b"%PDF"[..], "a.pdf", ContentType::from_extension("pdf"));
        let image = Part::image(&b"\x89PNG"[..], "logo.png", ContentType::from_extension("png"));
        let alt = Part::inline("plain body", ContentType::text_plain());

        assert!(file.is_attachment());
        assert!(image.is_attachment());
        assert!(!alt.is_attachment());
        assert!(alt.filename().is_none());
    }

    #[test]
    fn test_attachment_from_path() {
        let path = std::env::temp_dir().join(format!(
            "mailbridge-part-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let part = Part::attachment_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(part.kind(), PartKind::Attachment);
        assert_eq!(part.body().as_ref(), b"a,b\n1,2\n");
        assert_eq!(part.content_type().essence(), "text/csv");
        assert!(part.filename().unwrap().ends_with(".csv"));
    }

    #[test]
    fn test_attachment_from_missing_path() {
        assert!(Part::attachment_from_path("/nonexistent/mailbridge/file.pdf").is_err());
    }
}
