//! HTTP image fetcher.
//!
//! Downloads an attachment before context assembly. Every failure mode
//! (network, status, missing body) resolves to `None`: the exchange
//! simply proceeds without the image.

use banterline_core::image::ImageFetcher;
use banterline_types::turn::ImageAttachment;
use tracing::debug;

/// Fetches attachment bytes over HTTP.
#[derive(Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Option<ImageAttachment> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(url, error = %err, "image fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "image fetch rejected");
            return None;
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .unwrap_or_else(|| media_type_for(url));

        match response.bytes().await {
            Ok(bytes) => Some(ImageAttachment::from_bytes(media_type, &bytes)),
            Err(err) => {
                debug!(url, error = %err, "image body read failed");
                None
            }
        }
    }
}

/// Guess a MIME type from the URL's extension.
fn media_type_for(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    let media_type = if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    };
    media_type.to_string()
}
