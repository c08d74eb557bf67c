//! Client for the external image host that stores listing photos and broker
//! portraits. Images arrive as `data:` URLs from the admin forms and leave as
//! hosted `https://` URLs.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use realty_config::MediaConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Upper bound accepted by the hosting service.
pub const MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image hosting is not configured")]
    NotConfigured,
    #[error("not a base64 data URL")]
    InvalidDataUrl,
    #[error("unsupported media type {0}")]
    UnsupportedMime(String),
    #[error("image payload is not valid base64")]
    InvalidPayload(#[from] base64::DecodeError),
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("image host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image host rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected image host response: {0}")]
    Response(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedImage {
    pub url: String,
}

/// The pieces of a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub payload: String,
    pub size: usize,
}

pub fn decode_data_url(input: &str) -> Result<DataUrl, MediaError> {
    let rest = input
        .trim()
        .strip_prefix("data:")
        .ok_or(MediaError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::InvalidDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(MediaError::InvalidDataUrl)?
        .to_ascii_lowercase();

    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(MediaError::UnsupportedMime(mime));
    }

    let size = STANDARD.decode(payload)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge {
            limit: MAX_IMAGE_BYTES,
        });
    }

    Ok(DataUrl {
        mime,
        payload: payload.to_string(),
        size,
    })
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store a base64 encoded image and return its public URL.
    async fn upload(&self, base64_image: &str, name: &str) -> Result<HostedImage, MediaError>;
}

/// Build the host described by the configuration. Without an API key every
/// upload fails with [`MediaError::NotConfigured`].
pub fn image_host(config: &MediaConfig) -> Result<Arc<dyn ImageHost>, MediaError> {
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let host = HttpImageHost::new(
                key,
                &config.upload_url,
                Duration::from_secs(config.request_timeout_seconds),
            )?;
            info!(endpoint = %config.upload_url, "image hosting enabled");
            Ok(Arc::new(host))
        }
        _ => {
            info!("no media api key configured, image uploads disabled");
            Ok(Arc::new(DisabledImageHost))
        }
    }
}

/// ImgBB-compatible upload endpoint.
#[derive(Debug, Clone)]
pub struct HttpImageHost {
    client: Client,
    api_key: String,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: Option<String>,
}

impl HttpImageHost {
    pub fn new(api_key: &str, upload_url: &str, timeout: Duration) -> Result<Self, MediaError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            upload_url: upload_url.to_string(),
        })
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, base64_image: &str, name: &str) -> Result<HostedImage, MediaError> {
        let form = [
            ("key", self.api_key.as_str()),
            ("image", base64_image),
            ("name", name),
        ];

        let response = self.client.post(&self.upload_url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, name, "image host responded");

        let parsed: Option<UploadResponse> = serde_json::from_str(&body).ok();
        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = match parsed {
            Some(parsed) => parsed,
            None => serde_json::from_str(&body)?,
        };
        match parsed.data {
            Some(data) if parsed.success => Ok(HostedImage { url: data.url }),
            _ => Err(MediaError::Rejected {
                status: status.as_u16(),
                message: parsed
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "upload was not accepted".to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _base64_image: &str, _name: &str) -> Result<HostedImage, MediaError> {
        Err(MediaError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn decodes_png_data_url() {
        let url = format!("data:image/png;base64,{PIXEL}");
        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.payload, PIXEL);
        assert!(decoded.size > 0);
    }

    #[test]
    fn rejects_non_image_mime() {
        let url = format!("data:application/pdf;base64,{PIXEL}");
        assert!(matches!(
            decode_data_url(&url),
            Err(MediaError::UnsupportedMime(mime)) if mime == "application/pdf"
        ));
    }

    #[test]
    fn rejects_malformed_urls() {
        for input in [
            "https://i.ibb.co/abc/casa.jpg",
            "data:image/png,plain",
            "data:image/png;base64",
        ] {
            assert!(matches!(
                decode_data_url(input),
                Err(MediaError::InvalidDataUrl)
            ));
        }
        assert!(matches!(
            decode_data_url("data:image/jpeg;base64,não é base64"),
            Err(MediaError::InvalidPayload(_))
        ));
    }

    #[test]
    fn mime_is_lowercased() {
        let url = format!("data:image/JPEG;base64,{PIXEL}");
        assert_eq!(decode_data_url(&url).unwrap().mime, "image/jpeg");
    }

    #[tokio::test]
    async fn missing_key_disables_uploads() {
        let host = image_host(&MediaConfig::default()).unwrap();
        let result = host.upload(PIXEL, "foto").await;
        assert!(matches!(result, Err(MediaError::NotConfigured)));
    }
}
