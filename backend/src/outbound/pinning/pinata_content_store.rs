//! Reqwest-backed [`ContentStore`] pinning files to IPFS through Pinata.
//!
//! Uploads go to `pinFileToIPFS` with the pin name as metadata; the stable
//! URL handed back is the configured gateway plus the returned CID.
//! Downloads are plain GETs against that URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{ContentStore, ContentStoreError, PinRequest};

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";

/// Credentials and endpoints. Uploads fail with
/// [`ContentStoreError::NotConfigured`] while either key is missing.
#[derive(Clone)]
pub struct PinataSettings {
    pub api_url: Url,
    pub gateway_url: String,
    pub api_key: Option<String>,
    pub secret: Option<Zeroizing<String>>,
    pub timeout: Duration,
}

pub struct PinataContentStore {
    client: Client,
    api_url: Url,
    gateway_url: String,
    credentials: Option<(String, Zeroizing<String>)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: String,
}

impl PinataContentStore {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: PinataSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let credentials = match (settings.api_key, settings.secret) {
            (Some(key), Some(secret)) => Some((key, secret)),
            _ => None,
        };
        Ok(Self {
            client,
            api_url: settings.api_url,
            gateway_url: settings.gateway_url,
            credentials,
        })
    }
}

fn gateway_link(gateway: &str, cid: &str) -> String {
    format!("{}/{cid}", gateway.trim_end_matches('/'))
}

fn upload_form(request: PinRequest) -> Result<Form, ContentStoreError> {
    let part = Part::bytes(request.bytes)
        .file_name(request.file_name)
        .mime_str(&request.content_type)
        .map_err(|err| ContentStoreError::transport(format!("content type: {err}")))?;
    Ok(Form::new()
        .part("file", part)
        .text("pinataMetadata", json!({ "name": request.name }).to_string()))
}

fn parse_pin_response(body: &[u8]) -> Result<String, ContentStoreError> {
    let decoded: PinResponse = serde_json::from_slice(body)
        .map_err(|err| ContentStoreError::decode(format!("pin response: {err}")))?;
    if decoded.ipfs_hash.trim().is_empty() {
        return Err(ContentStoreError::decode("pin response carried an empty hash"));
    }
    Ok(decoded.ipfs_hash)
}

fn map_transport_error(error: reqwest::Error) -> ContentStoreError {
    if error.is_timeout() {
        ContentStoreError::transport(format!("timed out: {error}"))
    } else {
        ContentStoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ContentStoreError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = String::from_utf8_lossy(body)
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    ContentStoreError::rejected(status.as_u16(), preview)
}

#[async_trait]
impl ContentStore for PinataContentStore {
    async fn pin(&self, request: PinRequest) -> Result<String, ContentStoreError> {
        let Some((key, secret)) = &self.credentials else {
            return Err(ContentStoreError::not_configured());
        };
        let name = request.name.clone();
        let response = self
            .client
            .post(self.api_url.clone())
            .header("pinata_api_key", key.as_str())
            .header("pinata_secret_api_key", secret.as_str())
            .multipart(upload_form(request)?)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let cid = parse_pin_response(body.as_ref())?;
        debug!(%name, %cid, "content pinned");
        Ok(gateway_link(&self.gateway_url, &cid))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ContentStoreError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}
