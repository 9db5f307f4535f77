//! Turning a pull request description into an upload-ready image.
//!
//! The pipeline resolves the image reference from the description markup,
//! downloads and decodes it, optionally rejects screenshots, and normalises
//! the result under the upload ceiling.

pub mod fetch;
pub mod normalize;
pub mod resolver;
pub mod screenshot;

pub use fetch::{DecodedImage, HttpImageFetcher, ImageFetcher};
pub use normalize::{NormalizedPayload, UPLOAD_CEILING, normalize};
pub use resolver::{ImageReference, resolve};
pub use screenshot::{ScreenshotDetector, UniformBackgroundDetector};

#[cfg(test)]
pub use fetch::MockImageFetcher;
#[cfg(test)]
pub use screenshot::MockScreenshotDetector;

use tracing::debug;

use crate::error::BotError;

/// Downloads `image`, applies the screenshot check when a detector is
/// given, and normalises the result.
///
/// # Errors
///
/// Returns `BotError::ScreenshotDetected` when the detector rejects the
/// image, and fetch, decode, or encode errors otherwise.
pub async fn prepare<Fetcher>(
    image: &ImageReference,
    fetcher: &Fetcher,
    detector: Option<&dyn ScreenshotDetector>,
) -> Result<NormalizedPayload, BotError>
where
    Fetcher: ImageFetcher + ?Sized,
{
    let decoded = fetcher.fetch(&image.url).await?;

    if detector.is_some_and(|check| check.is_screenshot(&decoded.image)) {
        return Err(BotError::ScreenshotDetected);
    }

    debug!(
        url = %image.url,
        hint = image.format_hint.as_deref(),
        format = ?decoded.format,
        "preparing cutie"
    );
    normalize(&decoded)
}
