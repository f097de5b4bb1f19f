//! Attachment descriptors and upload constraints.
//!
//! The attachment store keeps two storage classes: rasters and video go in
//! as `image`-class objects, document-like extensions as `raw`. The class is
//! derived from the filename extension and must be passed back on deletion,
//! so it is recomputed from the stored `public_id` when needed.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upper bound on a single uploaded file, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Upper bound on files per upload request.
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// Extensions accepted for upload, lowercased.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "mp4", "pdf", "doc", "docx", "xls", "xlsx", "txt", "zip", "rar",
];

/// Extensions stored under the `raw` class rather than `image`.
const RAW_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "txt", "zip", "rar"];

/// Validation errors raised while admitting uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadValidationError {
    /// The filename carried no usable extension.
    MissingExtension { filename: String },
    /// The extension is outside the allowlist.
    ExtensionNotAllowed { extension: String },
    /// The file exceeds [`MAX_UPLOAD_BYTES`].
    FileTooLarge { filename: String },
    /// More than [`MAX_FILES_PER_REQUEST`] files in one request.
    TooManyFiles { count: usize },
}

impl fmt::Display for UploadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingExtension { filename } => {
                write!(f, "file {filename} has no extension")
            }
            Self::ExtensionNotAllowed { extension } => {
                write!(f, "file type not allowed: {extension}")
            }
            Self::FileTooLarge { filename } => {
                write!(
                    f,
                    "file {filename} exceeds the {} MiB limit",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )
            }
            Self::TooManyFiles { count } => {
                write!(
                    f,
                    "at most {MAX_FILES_PER_REQUEST} files per request, got {count}"
                )
            }
        }
    }
}

impl std::error::Error for UploadValidationError {}

/// Storage class hint passed to the attachment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Rasters and video.
    Image,
    /// Documents, archives, and anything else non-renderable.
    Raw,
}

impl AttachmentKind {
    /// Derive the storage class from a filename or public id.
    ///
    /// Unknown or missing extensions fall back to `Raw`; the allowlist has
    /// already been enforced at admission, so this only affects descriptors
    /// read back from storage.
    pub fn from_name(name: &str) -> Self {
        match extension_of(name) {
            Some(ext) if !RAW_EXTENSIONS.contains(&ext.as_str()) => Self::Image,
            _ => Self::Raw,
        }
    }

    /// Wire representation used by the store adapter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Raw => "raw",
        }
    }
}

/// Lowercased extension of a filename, if any.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Attachment descriptor as persisted and returned on the wire.
///
/// Field names stay snake_case on the wire: clients key removals by
/// `public_id` exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    /// Public URL serving the object.
    #[schema(example = "https://files.example/helpdesk-uploads/report.pdf")]
    pub url: String,
    /// Opaque identifier of the object in the attachment store.
    #[schema(example = "helpdesk-uploads/report.pdf")]
    pub public_id: String,
}

impl Attachment {
    /// Storage class of this attachment, derived from its public id.
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_name(&self.public_id)
    }
}

/// An uploaded file admitted from a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Admit an uploaded file, enforcing extension and size constraints.
    pub fn try_new(
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadValidationError> {
        let filename = filename.into();
        let Some(extension) = extension_of(&filename) else {
            return Err(UploadValidationError::MissingExtension { filename });
        };
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadValidationError::ExtensionNotAllowed { extension });
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadValidationError::FileTooLarge { filename });
        }
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    /// Original filename as sent by the client.
    pub fn filename(&self) -> &str {
        self.filename.as_str()
    }

    /// Declared content type, if the client sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File payload.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Storage class derived from the filename.
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_name(&self.filename)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.jpg", AttachmentKind::Image)]
    #[case("photo.JPEG", AttachmentKind::Image)]
    #[case("clip.mp4", AttachmentKind::Image)]
    #[case("report.pdf", AttachmentKind::Raw)]
    #[case("sheet.xlsx", AttachmentKind::Raw)]
    #[case("bundle.zip", AttachmentKind::Raw)]
    #[case("no-extension", AttachmentKind::Raw)]
    fn storage_class_follows_extension(#[case] name: &str, #[case] expected: AttachmentKind) {
        assert_eq!(AttachmentKind::from_name(name), expected);
    }

    #[rstest]
    #[case("script.exe")]
    #[case("page.html")]
    fn disallowed_extensions_are_rejected(#[case] name: &str) {
        let err = UploadedFile::try_new(name, None, vec![0u8; 8]).expect_err("rejected");
        assert!(matches!(
            err,
            UploadValidationError::ExtensionNotAllowed { .. }
        ));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = UploadedFile::try_new("README", None, vec![]).expect_err("rejected");
        assert!(matches!(err, UploadValidationError::MissingExtension { .. }));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let err = UploadedFile::try_new("big.pdf", None, vec![0u8; MAX_UPLOAD_BYTES + 1])
            .expect_err("rejected");
        assert!(matches!(err, UploadValidationError::FileTooLarge { .. }));
    }

    #[test]
    fn attachment_wire_shape_is_snake_case() {
        let attachment = Attachment {
            url: "https://files.example/x.pdf".to_owned(),
            public_id: "helpdesk-uploads/x.pdf".to_owned(),
        };
        let value = serde_json::to_value(&attachment).expect("serialise attachment");
        assert_eq!(value["public_id"], "helpdesk-uploads/x.pdf");
        assert!(value.get("publicId").is_none());
    }
}
