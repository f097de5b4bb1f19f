//! Reqwest-backed attachment store adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding into attachment descriptors.
//! Objects are namespaced under a configured folder, and document-class
//! files ride the `raw` endpoint while rasters and video use `image`,
//! mirroring how the provider partitions storage.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::warn;

use crate::domain::ports::{AttachmentStore, AttachmentStoreError};
use crate::domain::{Attachment, AttachmentKind, UploadedFile};

use super::retry::RetryPolicy;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FOLDER: &str = "helpdesk-uploads";

/// Connection settings for the attachment store provider.
#[derive(Debug, Clone)]
pub struct AttachmentStoreConfig {
    /// Base URL of the provider API.
    pub base_url: Url,
    /// Bearer token, if the provider requires one.
    pub api_key: Option<String>,
    /// Folder prefix under which objects are stored.
    pub folder: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl AttachmentStoreConfig {
    /// Settings with the default folder and timeout.
    pub fn new(base_url: Url, api_key: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            folder: DEFAULT_FOLDER.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the folder prefix.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Attachment store adapter performing HTTP calls against one provider.
pub struct HttpAttachmentStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    folder: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct StoredObjectDto {
    url: String,
    public_id: String,
}

impl HttpAttachmentStore {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: AttachmentStoreConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            folder: config.folder,
            retry: RetryPolicy::default(),
        })
    }

    /// Public id under which a file will be stored.
    fn public_id_for(&self, filename: &str) -> String {
        format!("{}/{}", self.folder, filename)
    }

    fn endpoint(&self, kind: AttachmentKind) -> Result<Url, AttachmentStoreError> {
        self.base_url
            .join(&format!("files/{}", kind.as_str()))
            .map_err(|err| AttachmentStoreError::decode(format!("invalid endpoint: {err}")))
    }

    fn authorise(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn upload_once(&self, file: &UploadedFile) -> Result<Attachment, AttachmentStoreError> {
        let endpoint = self.endpoint(file.kind())?;
        let mut part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.filename().to_owned());
        if let Some(content_type) = file.content_type() {
            part = part
                .mime_str(content_type)
                .map_err(|err| AttachmentStoreError::decode(format!("invalid mime: {err}")))?;
        }
        let form = reqwest::multipart::Form::new()
            .text("public_id", self.public_id_for(file.filename()))
            .part("file", part);

        let response = self
            .authorise(self.client.post(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: StoredObjectDto = serde_json::from_slice(body.as_ref()).map_err(|err| {
            AttachmentStoreError::decode(format!("invalid store response: {err}"))
        })?;
        Ok(Attachment {
            url: decoded.url,
            public_id: decoded.public_id,
        })
    }

    async fn delete_once(
        &self,
        public_id: &str,
        kind: AttachmentKind,
    ) -> Result<(), AttachmentStoreError> {
        let endpoint = self.endpoint(kind)?;
        let response = self
            .authorise(self.client.delete(endpoint))
            .query(&[("public_id", public_id)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // Already gone; deletion is idempotent so a retry after a
            // partial failure does not wedge on the completed half.
            warn!(public_id, "object was already absent from the store");
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(())
    }

    async fn resolve_url_once(
        &self,
        public_id: &str,
        kind: AttachmentKind,
    ) -> Result<String, AttachmentStoreError> {
        let endpoint = self.endpoint(kind)?;
        let response = self
            .authorise(self.client.get(endpoint))
            .query(&[("public_id", public_id)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let decoded: StoredObjectDto = serde_json::from_slice(body.as_ref()).map_err(|err| {
            AttachmentStoreError::decode(format!("invalid store response: {err}"))
        })?;
        Ok(decoded.url)
    }
}

fn map_transport_error(error: reqwest::Error) -> AttachmentStoreError {
    AttachmentStoreError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AttachmentStoreError {
    let snippet: String = String::from_utf8_lossy(body).chars().take(200).collect();
    if status.is_server_error() {
        AttachmentStoreError::transport(format!("store answered {status}: {snippet}"))
    } else {
        AttachmentStoreError::rejected(format!("store answered {status}: {snippet}"))
    }
}

#[async_trait]
impl AttachmentStore for HttpAttachmentStore {
    async fn upload(&self, file: &UploadedFile) -> Result<Attachment, AttachmentStoreError> {
        self.retry.run(|| self.upload_once(file)).await
    }

    async fn delete(
        &self,
        public_id: &str,
        kind: AttachmentKind,
    ) -> Result<(), AttachmentStoreError> {
        self.retry.run(|| self.delete_once(public_id, kind)).await
    }

    async fn resolve_url(
        &self,
        public_id: &str,
        kind: AttachmentKind,
    ) -> Result<String, AttachmentStoreError> {
        self.retry
            .run(|| self.resolve_url_once(public_id, kind))
            .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn store() -> HttpAttachmentStore {
        let config = AttachmentStoreConfig::new(
            Url::parse("https://files.example/api/").expect("valid url"),
            None,
        );
        HttpAttachmentStore::new(config).expect("client builds")
    }

    #[test]
    fn public_ids_are_namespaced_under_the_folder() {
        assert_eq!(
            store().public_id_for("report.pdf"),
            "helpdesk-uploads/report.pdf"
        );
    }

    #[rstest]
    #[case(AttachmentKind::Image, "https://files.example/api/files/image")]
    #[case(AttachmentKind::Raw, "https://files.example/api/files/raw")]
    fn endpoints_follow_the_storage_class(#[case] kind: AttachmentKind, #[case] expected: &str) {
        assert_eq!(store().endpoint(kind).expect("endpoint").as_str(), expected);
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, false)]
    fn server_errors_are_transient_and_client_errors_are_not(
        #[case] status: StatusCode,
        #[case] transient: bool,
    ) {
        let err = map_status_error(status, b"boom");
        assert_eq!(err.is_transient(), transient);
    }
}
