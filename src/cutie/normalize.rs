//! Fitting decoded images under the upload ceiling.
//!
//! The publishing API rejects media of [`UPLOAD_CEILING`] bytes or more. Small
//! images are re-encoded in their own format, animations of known small size
//! are passed through untouched, and everything else is downscaled until the
//! encoded output fits. The payload is produced base64-encoded, which is what
//! the upload endpoint expects.

use std::borrow::Cow;
use std::io::{self, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Frame, ImageFormat};
use tracing::{debug, warn};

use crate::error::BotError;

use super::fetch::DecodedImage;

/// Largest accepted upload is one byte below this.
pub const UPLOAD_CEILING: u64 = 3_145_728;

const JPEG_QUALITY: u8 = 95;
const MAX_SHRINK_STEPS: u32 = 16;

/// How an image is turned into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Downscale until the encoded size is below the ceiling.
    Shrink,
    /// Post the downloaded animation bytes as they are.
    PassThrough,
    /// Re-encode at full size.
    Reencode,
}

/// Picks the normalisation path from the declared download size.
///
/// # Example
///
/// ```
/// use cutiebot::cutie::normalize::{Strategy, UPLOAD_CEILING, choose_strategy};
///
/// assert_eq!(choose_strategy(Some(UPLOAD_CEILING - 1), false), Strategy::Reencode);
/// assert_eq!(choose_strategy(Some(UPLOAD_CEILING), false), Strategy::Shrink);
/// assert_eq!(choose_strategy(None, true), Strategy::Shrink);
/// ```
#[must_use]
pub const fn choose_strategy(source_size: Option<u64>, animated: bool) -> Strategy {
    match source_size {
        Some(size) if size < UPLOAD_CEILING => {
            if animated {
                Strategy::PassThrough
            } else {
                Strategy::Reencode
            }
        }
        _ => Strategy::Shrink,
    }
}

/// Base64-encoded media ready for upload.
///
/// An empty payload means there is nothing to post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPayload {
    base64: String,
}

impl NormalizedPayload {
    fn encode(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
        }
    }

    /// Borrow the base64 text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.base64.as_str()
    }

    /// Returns true when there is nothing to post.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base64.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeFamily {
    Jpeg,
    Png,
    Gif,
}

impl EncodeFamily {
    fn for_format(format: ImageFormat) -> Result<Self, BotError> {
        match format {
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Gif => Ok(Self::Gif),
            other => Err(BotError::UnsupportedFormat {
                format: format!("{other:?}").to_lowercase(),
            }),
        }
    }

    fn encode<W: Write>(self, image: &DynamicImage, sink: W) -> Result<(), BotError> {
        let result = match self {
            Self::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(sink, JPEG_QUALITY)),
            Self::Png => image.write_with_encoder(PngEncoder::new(sink)),
            Self::Gif => {
                // The trailer is written when the encoder drops at the end of
                // this arm.
                let mut encoder = GifEncoder::new(sink);
                encoder.encode_frame(Frame::new(image.to_rgba8()))
            }
        };
        result.map_err(|error| BotError::Encode {
            message: error.to_string(),
        })
    }
}

/// Write sink that only measures.
#[derive(Debug, Default)]
struct CountingWriter {
    written: u64,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = u64::try_from(buf.len()).unwrap_or(u64::MAX);
        self.written = self.written.saturating_add(len);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Produces an upload payload below [`UPLOAD_CEILING`].
///
/// # Errors
///
/// Returns `BotError::UnsupportedFormat` for formats other than JPEG, PNG,
/// and GIF, and `BotError::Encode` when encoding fails or the image cannot be
/// shrunk enough.
pub fn normalize(decoded: &DecodedImage) -> Result<NormalizedPayload, BotError> {
    let family = EncodeFamily::for_format(decoded.format)?;
    let strategy = choose_strategy(decoded.source_size, decoded.animation.is_some());
    debug!(?strategy, format = ?decoded.format, size = ?decoded.source_size, "normalising image");

    let payload = match strategy {
        Strategy::PassThrough => match decoded.animation.as_deref() {
            Some(raw) if fits(raw.len()) => NormalizedPayload::encode(raw),
            _ => shrink(&decoded.image, family)?,
        },
        Strategy::Reencode => {
            let mut bytes = Vec::new();
            family.encode(&decoded.image, &mut bytes)?;
            if fits(bytes.len()) {
                NormalizedPayload::encode(&bytes)
            } else {
                debug!(size = bytes.len(), "re-encoded image too large, shrinking");
                shrink(&decoded.image, family)?
            }
        }
        Strategy::Shrink => shrink(&decoded.image, family)?,
    };

    if payload.is_empty() {
        warn!("normalised image is empty");
    }
    Ok(payload)
}

fn fits(len: usize) -> bool {
    u64::try_from(len).is_ok_and(|size| size < UPLOAD_CEILING)
}

const fn three_quarters(dimension: u32) -> u32 {
    if dimension <= 1 {
        return 1;
    }
    let quarter = dimension >> 2;
    dimension - if quarter == 0 { 1 } else { quarter }
}

fn shrink(image: &DynamicImage, family: EncodeFamily) -> Result<NormalizedPayload, BotError> {
    let mut candidate = Cow::Borrowed(image);

    for step in 0..=MAX_SHRINK_STEPS {
        let mut counter = CountingWriter::default();
        family.encode(&candidate, &mut counter)?;

        if counter.written < UPLOAD_CEILING {
            debug!(
                step,
                width = candidate.width(),
                height = candidate.height(),
                size = counter.written,
                "image fits upload ceiling"
            );
            let mut writer = EncoderStringWriter::new(&STANDARD);
            family.encode(&candidate, &mut writer)?;
            return Ok(NormalizedPayload {
                base64: writer.into_inner(),
            });
        }

        let (width, height) = (candidate.width(), candidate.height());
        if width <= 1 && height <= 1 {
            break;
        }
        candidate = Cow::Owned(candidate.resize(
            three_quarters(width),
            three_quarters(height),
            FilterType::Triangle,
        ));
    }

    Err(BotError::Encode {
        message: format!("cannot shrink image below {UPLOAD_CEILING} bytes"),
    })
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use rstest::rstest;

    use super::{Strategy, UPLOAD_CEILING, choose_strategy, normalize, three_quarters};
    use crate::cutie::fetch::DecodedImage;
    use crate::error::BotError;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    /// Incompressible pixels so PNG output stays close to the raw size.
    fn noise(width: u32, height: u32) -> DynamicImage {
        let mut state = 0x2545_f491_u32;
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Rgba(state.to_le_bytes())
        }))
    }

    fn decoded(image: DynamicImage, format: ImageFormat, source_size: Option<u64>) -> DecodedImage {
        DecodedImage {
            image,
            format,
            animation: None,
            source_size,
        }
    }

    fn decode_payload(payload: &super::NormalizedPayload) -> Vec<u8> {
        STANDARD
            .decode(payload.as_str())
            .expect("payload should be valid base64")
    }

    #[rstest]
    #[case::below_ceiling(Some(UPLOAD_CEILING - 1), false, Strategy::Reencode)]
    #[case::at_ceiling(Some(UPLOAD_CEILING), false, Strategy::Shrink)]
    #[case::unknown_size(None, false, Strategy::Shrink)]
    #[case::small_animation(Some(UPLOAD_CEILING - 1), true, Strategy::PassThrough)]
    #[case::large_animation(Some(UPLOAD_CEILING), true, Strategy::Shrink)]
    fn strategy_follows_declared_size(
        #[case] size: Option<u64>,
        #[case] animated: bool,
        #[case] expected: Strategy,
    ) {
        assert_eq!(choose_strategy(size, animated), expected);
    }

    #[rstest]
    fn png_round_trips_losslessly() {
        let image = gradient(16, 9);
        let payload = normalize(&decoded(image.clone(), ImageFormat::Png, Some(2_048)))
            .expect("normalise should succeed");

        let bytes = decode_payload(&payload);
        let round_tripped = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .expect("payload should be a PNG");
        assert_eq!(round_tripped.to_rgb8(), image.to_rgb8());
    }

    #[rstest]
    fn jpeg_is_reencoded_as_jpeg() {
        let payload = normalize(&decoded(gradient(32, 32), ImageFormat::Jpeg, Some(4_096)))
            .expect("normalise should succeed");

        let bytes = decode_payload(&payload);
        assert_eq!(
            image::guess_format(&bytes).expect("format should be recognised"),
            ImageFormat::Jpeg
        );
    }

    #[rstest]
    fn small_animation_passes_through_unchanged() {
        let raw = b"GIF89a-pretend-animation".to_vec();
        let mut image = decoded(gradient(2, 2), ImageFormat::Gif, Some(raw.len() as u64));
        image.animation = Some(raw.clone());

        let payload = normalize(&image).expect("normalise should succeed");

        assert_eq!(decode_payload(&payload), raw);
    }

    #[rstest]
    fn unknown_size_keeps_small_images_at_full_size() {
        let payload = normalize(&decoded(gradient(20, 10), ImageFormat::Gif, None))
            .expect("normalise should succeed");

        let bytes = decode_payload(&payload);
        let round_tripped = image::load_from_memory_with_format(&bytes, ImageFormat::Gif)
            .expect("payload should be a GIF");
        assert_eq!((round_tripped.width(), round_tripped.height()), (20, 10));
    }

    #[rstest]
    fn oversized_image_is_shrunk_below_ceiling() {
        let payload = normalize(&decoded(noise(1024, 1024), ImageFormat::Png, None))
            .expect("normalise should succeed");

        let bytes = decode_payload(&payload);
        assert!((bytes.len() as u64) < UPLOAD_CEILING, "payload is {} bytes", bytes.len());
        let shrunk = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .expect("payload should be a PNG");
        assert!(shrunk.width() < 1024);
        assert_eq!(shrunk.width(), shrunk.height());
    }

    #[rstest]
    fn unsupported_format_is_rejected() {
        let error = normalize(&decoded(gradient(2, 2), ImageFormat::WebP, Some(10)))
            .expect_err("webp cannot be re-encoded");

        assert_eq!(
            error,
            BotError::UnsupportedFormat {
                format: "webp".to_owned()
            }
        );
    }

    #[rstest]
    #[case(1024, 768)]
    #[case(3, 2)]
    #[case(2, 1)]
    #[case(1, 1)]
    fn shrink_step_never_reaches_zero(#[case] dimension: u32, #[case] expected: u32) {
        assert_eq!(three_quarters(dimension), expected);
    }
}
