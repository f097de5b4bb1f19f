//! Multipart upload parsing for incident endpoints.
//!
//! Admits at most [`MAX_FILES_PER_REQUEST`] files under the `files` field,
//! each capped at [`MAX_UPLOAD_BYTES`] and filtered by the extension
//! allowlist; plain text fields are collected alongside so `POST /incidents`
//! can carry title/description/priority in the same request.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::TryStreamExt;

use crate::domain::{
    Error, MAX_FILES_PER_REQUEST, MAX_UPLOAD_BYTES, UploadValidationError, UploadedFile,
};

/// Multipart field name carrying file parts.
pub const FILES_FIELD: &str = "files";

/// Upper bound on a single text field, to keep hostile payloads bounded.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Parsed multipart request: plain text fields plus admitted files.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Text fields keyed by multipart field name.
    pub text_fields: HashMap<String, String>,
    /// Files admitted from the `files` field, in request order.
    pub files: Vec<UploadedFile>,
}

impl UploadForm {
    /// A text field's value, if the request carried it.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).map(String::as_str)
    }
}

/// Read an entire multipart request into an [`UploadForm`].
pub async fn parse_upload_form(mut payload: Multipart) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            drain(&mut field).await?;
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(ToOwned::to_owned);

        match filename {
            Some(filename) if name == FILES_FIELD => {
                if form.files.len() >= MAX_FILES_PER_REQUEST {
                    return Err(map_upload_validation(&UploadValidationError::TooManyFiles {
                        count: form.files.len() + 1,
                    }));
                }
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = read_file_bytes(&mut field, &filename).await?;
                let file = UploadedFile::try_new(filename, content_type, bytes)
                    .map_err(|err| map_upload_validation(&err))?;
                form.files.push(file);
            }
            // A file part under any other field name is not ours to store.
            Some(_) => drain(&mut field).await?,
            None => {
                let value = read_text(&mut field, &name).await?;
                form.text_fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

fn map_multipart_error(err: MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart payload: {err}"))
}

fn map_upload_validation(err: &UploadValidationError) -> Error {
    Error::field_validation(FILES_FIELD, err.to_string())
}

async fn read_file_bytes(field: &mut Field, filename: &str) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(map_upload_validation(&UploadValidationError::FileTooLarge {
                filename: filename.to_owned(),
            }));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(Error::field_validation(name, format!("{name} is too long")));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| Error::field_validation(name, format!("{name} must be valid UTF-8")))
}

async fn drain(field: &mut Field) -> Result<(), Error> {
    while field
        .try_next()
        .await
        .map_err(map_multipart_error)?
        .is_some()
    {}
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module. Full multipart round-trips are
    //! exercised through the incident handler tests.
    use super::*;

    #[test]
    fn upload_validation_maps_to_the_files_field() {
        let err = map_upload_validation(&UploadValidationError::TooManyFiles { count: 11 });
        let details = err.details.expect("field details");
        assert!(
            details["errors"]["files"]
                .as_str()
                .expect("message string")
                .contains("at most 10 files")
        );
    }

    #[test]
    fn form_text_lookup_returns_none_for_absent_fields() {
        let form = UploadForm::default();
        assert!(form.text("title").is_none());
    }
}
