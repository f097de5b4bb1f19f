//! Port abstraction for the external attachment (object) store.

use async_trait::async_trait;

use crate::domain::attachment::{Attachment, AttachmentKind, UploadedFile};

/// Errors raised by attachment store adapters.
///
/// Transport failures are the only transient class; adapters retry those
/// internally, so a surfaced `Transport` means retries were exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentStoreError {
    /// Network-level failure or timeout talking to the provider.
    #[error("attachment store transport failed: {message}")]
    Transport {
        /// Adapter-level failure description.
        message: String,
    },
    /// The provider refused the operation (bad request, missing object).
    #[error("attachment store rejected the operation: {message}")]
    Rejected {
        /// Provider-supplied rejection reason.
        message: String,
    },
    /// The provider answered with a payload the adapter could not decode.
    #[error("attachment store response could not be decoded: {message}")]
    Decode {
        /// Adapter-level failure description.
        message: String,
    },
}

impl AttachmentStoreError {
    /// Transport-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Provider rejection.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Undecodable response.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Port for uploading, deleting, and resolving stored objects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Upload one file and return its descriptor.
    async fn upload(&self, file: &UploadedFile) -> Result<Attachment, AttachmentStoreError>;

    /// Delete the object behind `public_id`. The storage class must match
    /// the one the object was uploaded under.
    async fn delete(
        &self,
        public_id: &str,
        kind: AttachmentKind,
    ) -> Result<(), AttachmentStoreError>;

    /// Resolve the serving URL for an already-stored object.
    async fn resolve_url(
        &self,
        public_id: &str,
        kind: AttachmentKind,
    ) -> Result<String, AttachmentStoreError>;
}
