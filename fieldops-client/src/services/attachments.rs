//! Attachment uploader.
//!
//! One multipart call uploads the binary and registers it against the
//! target document. Writing the returned URL onto the owning record's
//! field is still the caller's job; upload-time linking only registers
//! the blob.

use fieldops_core::error::{FieldOpsError, Result};
use fieldops_core::models::ImageAsset;
use reqwest::{header, multipart, Client};
use serde::Deserialize;

use crate::session::SessionContext;

#[derive(Clone)]
pub struct AttachmentUploader {
    http: Client,
    base_url: String,
    private_uploads: bool,
}

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    message: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    file_url: String,
}

impl AttachmentUploader {
    pub fn new(http: Client, base_url: impl Into<String>, private_uploads: bool) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            private_uploads,
        }
    }

    /// Upload one image and link it to `doctype`/`docname`, returning the
    /// durable remote URL.
    pub async fn upload(
        &self,
        session: &SessionContext,
        asset: &ImageAsset,
        doctype: &str,
        docname: &str,
        fieldname: &str,
    ) -> Result<String> {
        let uri = asset.uri.as_deref().ok_or(FieldOpsError::InvalidAsset)?;
        let bytes = tokio::fs::read(uri).await.map_err(|err| {
            tracing::warn!(uri, error = %err, "image asset unreadable");
            FieldOpsError::InvalidAsset
        })?;

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(asset.file_name.clone()),
            )
            .text("doctype", doctype.to_string())
            .text("docname", docname.to_string())
            .text("fieldname", fieldname.to_string())
            .text("is_private", if self.private_uploads { "1" } else { "0" });

        let response = self
            .http
            .post(format!("{}/method/upload_file", self.base_url))
            .header(header::COOKIE, session.cookie())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(doctype, docname, status = %status, "upload_file response");

        if !status.is_success() {
            tracing::error!(doctype, docname, status = %status, body = %body, "attachment upload rejected");
            return Err(FieldOpsError::UploadFailed {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<UploadEnvelope>(&body) {
            Ok(envelope) => {
                tracing::info!(doctype, docname, file_url = %envelope.message.file_url, "attachment uploaded");
                Ok(envelope.message.file_url)
            }
            // 2xx without a file URL is still a failed upload.
            Err(_) => Err(FieldOpsError::UploadFailed {
                status: status.as_u16(),
                body,
            }),
        }
    }
}
