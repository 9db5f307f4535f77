//! Image download and decoding.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, ImageReader};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::BotError;

/// Some image hosts refuse requests without a browser user agent.
const USER_AGENT: &str = "Mozilla/5.0 Firefox/26.0";

const GIF_MIME: &str = "image/gif";

/// Largest image body accepted by default. Anything bigger cannot be shrunk
/// under the upload ceiling in reasonable time.
pub const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// A downloaded image ready for normalisation.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Decoded pixels (first frame for animations).
    pub image: DynamicImage,
    /// Container format sniffed from the bytes.
    pub format: ImageFormat,
    /// Raw GIF bytes kept so animations can be posted unchanged.
    pub animation: Option<Vec<u8>>,
    /// Declared `Content-Length`; `None` when the host did not send one.
    pub source_size: Option<u64>,
}

impl DecodedImage {
    /// Decodes `bytes`, sniffing the format from their content.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Decode` when the bytes are not a supported image.
    pub fn from_bytes(bytes: &[u8], source_size: Option<u64>) -> Result<Self, BotError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|error| BotError::Decode {
                message: error.to_string(),
            })?;
        let format = reader.format().ok_or_else(|| BotError::Decode {
            message: "unrecognised image container".to_owned(),
        })?;
        let image = reader.decode().map_err(|error| BotError::Decode {
            message: error.to_string(),
        })?;

        Ok(Self {
            image,
            format,
            animation: None,
            source_size,
        })
    }
}

/// Downloads and decodes images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches the image at `url`.
    async fn fetch(&self, url: &str) -> Result<DecodedImage, BotError>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpImageFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Configuration` when the HTTP client cannot be
    /// constructed.
    pub fn new(timeout: Duration) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|error| BotError::Configuration {
                message: format!("cannot build image HTTP client: {error}"),
            })?;
        Ok(Self {
            client,
            max_bytes: MAX_DOWNLOAD_BYTES,
        })
    }

    /// Rejects bodies larger than `max_bytes`.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<DecodedImage, BotError> {
        let fetch_error = |message: String| BotError::Fetch {
            url: url.to_owned(),
            message,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| fetch_error(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("unexpected status {status}")));
        }

        let source_size = response.content_length();
        if let Some(declared) = source_size.filter(|size| *size > self.max_bytes) {
            return Err(fetch_error(format!(
                "image too large: {declared} bytes exceeds {} bytes",
                self.max_bytes
            )));
        }
        let is_gif = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(GIF_MIME));
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|error| fetch_error(error.to_string()))?
        {
            let received = u64::try_from(bytes.len() + chunk.len()).unwrap_or(u64::MAX);
            if received > self.max_bytes {
                return Err(fetch_error(format!(
                    "image too large: body exceeds {} bytes",
                    self.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(url, size = ?source_size, is_gif, "downloaded image");

        let mut decoded = DecodedImage::from_bytes(&bytes, source_size)?;
        if is_gif {
            decoded.animation = Some(bytes);
        }
        Ok(decoded)
    }
}
