//! Uploading `data:` images before a write.
//!
//! Upload and database write are two separate steps. When the write fails
//! the hosted images stay behind; they are logged so they can be cleaned up
//! by hand.

use realty_media::{decode_data_url, HostedImage, ImageHost, MediaError};
use tracing::{info, warn};

use crate::util::upload_name;

/// Image list after uploading, plus the URLs that were created by it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedImages {
    pub urls: Vec<String>,
    pub uploaded: Vec<String>,
}

pub async fn upload_data_url(
    host: &dyn ImageHost,
    data_url: &str,
    name: &str,
) -> Result<HostedImage, MediaError> {
    let decoded = decode_data_url(data_url)?;
    let hosted = host.upload(&decoded.payload, name).await?;
    info!(name, mime = %decoded.mime, bytes = decoded.size, url = %hosted.url, "image uploaded");
    Ok(hosted)
}

/// Upload every `data:` entry of `images`, keeping order. Hosted URLs pass
/// through untouched.
pub async fn resolve_images(
    host: &dyn ImageHost,
    images: &[String],
    owner: &str,
) -> Result<ResolvedImages, MediaError> {
    let mut resolved = ResolvedImages::default();

    for (index, image) in images.iter().enumerate() {
        if image.trim_start().starts_with("data:") {
            let hosted = upload_data_url(host, image, &upload_name(owner, index)).await;
            let hosted = match hosted {
                Ok(hosted) => hosted,
                Err(error) => {
                    warn_orphaned(&resolved.uploaded, &error);
                    return Err(error);
                }
            };
            resolved.uploaded.push(hosted.url.clone());
            resolved.urls.push(hosted.url);
        } else {
            resolved.urls.push(image.clone());
        }
    }

    Ok(resolved)
}

pub fn warn_orphaned(uploaded: &[String], error: &dyn std::fmt::Display) {
    if !uploaded.is_empty() {
        warn!(urls = ?uploaded, %error, "write failed after upload, hosted images orphaned");
    }
}
