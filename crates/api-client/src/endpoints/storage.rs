//! Upload and object storage endpoints
//!
//! Two upload paths coexist:
//! - **Signed URL**: ask the backend for a signed upload URL, `PUT` the bytes
//!   there, and store the returned public URL
//! - **CDN preset**: multipart `POST` straight to the media CDN with an
//!   unsigned upload preset, storing the returned `secure_url`
//!
//! Both check size and format locally first, so a rejected file never
//! reaches the network.

use crate::client::GigmapClient;
use crate::error::{ApiError, ApiResult};
use gigmap_image::{validate_upload, ImageFormat};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

/// Which upload path a flow uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPath {
    /// Backend-signed object storage URL
    Signed,
    /// Legacy media CDN with an unsigned preset
    Cdn,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedUpload {
    signed_url: String,
    public_url: String,
}

#[derive(Debug, Deserialize)]
struct CdnUpload {
    secure_url: String,
}

/// Storage API interface
#[derive(Clone, Debug)]
pub struct StorageApi {
    client: GigmapClient,
}

impl StorageApi {
    /// Create a new storage API interface
    pub(crate) fn new(client: GigmapClient) -> Self {
        Self { client }
    }

    /// Object path for a new upload: `{folder}/{owner}/{random}.{ext}`
    #[must_use]
    pub fn object_path(folder: &str, owner_uid: &str, format: ImageFormat) -> String {
        format!("{folder}/{owner_uid}/{}.{}", Uuid::new_v4().simple(), format.extension())
    }

    /// Public URL of a stored object
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/public/{}",
            self.client.config().object_api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn check(&self, data: &[u8]) -> ApiResult<ImageFormat> {
        Ok(validate_upload(data, self.client.config().max_upload_bytes)?)
    }

    /// Upload through the chosen path and return the URL to store
    pub async fn upload(&self, via: UploadPath, path: &str, data: Vec<u8>) -> ApiResult<String> {
        match via {
            UploadPath::Signed => self.upload_signed(path, data).await,
            UploadPath::Cdn => self.upload_cdn(path, data).await,
        }
    }

    /// Upload via a backend-signed URL
    #[instrument(skip(self, data), fields(bytes = data.len(), request_id))]
    pub async fn upload_signed(&self, path: &str, data: Vec<u8>) -> ApiResult<String> {
        let format = self.check(&data)?;
        let config = self.client.config();

        let signed: SignedUpload = self
            .client
            .post_json(
                &config.signed_url_endpoint,
                &json!({"path": path, "contentType": format.mime_type()}),
                None,
            )
            .await?;

        let request = self
            .client
            .public_request_builder(Method::PUT, &signed.signed_url)
            .header(CONTENT_TYPE, format.mime_type())
            .body(data);
        let response = self.client.execute(request, None).await?;
        GigmapClient::check_status(response).await?;

        info!(path, "uploaded via signed URL");
        Ok(signed.public_url)
    }

    /// Upload to the media CDN with the unsigned preset
    #[instrument(skip(self, data), fields(bytes = data.len(), request_id))]
    pub async fn upload_cdn(&self, file_name: &str, data: Vec<u8>) -> ApiResult<String> {
        let format = self.check(&data)?;
        let config = self.client.config();

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(format.mime_type())
            .map_err(ApiError::Request)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", config.cdn_upload_preset.clone());

        let request = self
            .client
            .public_request_builder(Method::POST, &config.cdn_upload_url())
            .multipart(form);
        let response = self.client.execute(request, None).await?;
        let uploaded: CdnUpload = self.client.handle_response(response).await?;

        info!(file_name, "uploaded via media CDN");
        Ok(uploaded.secure_url)
    }

    /// Delete a stored object by path
    #[instrument(skip(self), fields(request_id))]
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = format!(
            "{}/{}",
            self.client.config().object_api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let request = self.client.request_builder(Method::DELETE, &url);
        let response = self.client.execute(request, None).await?;
        GigmapClient::check_status(response).await?;
        Ok(())
    }
}
