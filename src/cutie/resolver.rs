//! Image reference extraction from pull request descriptions.
//!
//! Two Markdown shapes are recognised. A linked thumbnail,
//! `[![alt](image)](target)`, always wins over a plain embedded image,
//! `![alt](image)`. Within each shape the last occurrence in the description
//! is chosen, because authors tend to append their cutie after the change
//! summary.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static LINKED_THUMBNAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[!\[.*\]\((.*)\)\]\(.*\)").ok());

static EMBEDDED_IMAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"!\[.*\]\((.*)\)").ok());

/// An image URL found in a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Image location with any trailing caption removed.
    pub url: String,
    /// Lower-cased file extension of the URL path, when present.
    pub format_hint: Option<String>,
}

impl ImageReference {
    fn from_capture(captured: &str) -> Option<Self> {
        let url = captured.split_whitespace().next()?;
        Some(Self {
            url: url.to_owned(),
            format_hint: extension_of(url),
        })
    }
}

/// Picks the image to post from a pull request description.
///
/// Returns `None` when the description embeds no image.
///
/// # Example
///
/// ```
/// use cutiebot::cutie::resolve;
///
/// let body = "![first](https://a.example/1.png)\n![second](https://a.example/2.jpg \"cat\")";
/// let image = resolve(body).expect("an image is embedded");
/// assert_eq!(image.url, "https://a.example/2.jpg");
/// assert_eq!(image.format_hint.as_deref(), Some("jpg"));
/// ```
#[must_use]
pub fn resolve(body: &str) -> Option<ImageReference> {
    last_capture(&LINKED_THUMBNAIL, body)
        .or_else(|| last_capture(&EMBEDDED_IMAGE, body))
        .and_then(ImageReference::from_capture)
}

fn last_capture<'body>(pattern: &Option<Regex>, body: &'body str) -> Option<&'body str> {
    pattern
        .as_ref()?
        .captures_iter(body)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str())
}

fn extension_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let file_name = parsed.path_segments()?.next_back()?;
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ImageReference, resolve};

    #[rstest]
    #[case::last_plain_image_wins(
        "![a](https://x.example/1.png) text ![b](https://x.example/2.png)",
        Some("https://x.example/2.png")
    )]
    #[case::linked_thumbnail_preferred(
        "[![t](https://x.example/thumb.jpg)](https://x.example/full.jpg)\n![p](https://x.example/plain.png)",
        Some("https://x.example/thumb.jpg")
    )]
    #[case::linked_thumbnail_beats_plain_image_on_same_line(
        "[![t](https://flick.example/x.jpg)](https://flick.example/p/1) ![also](https://example.com/b.png)",
        Some("https://flick.example/x.jpg")
    )]
    #[case::last_linked_thumbnail_wins(
        "[![a](https://x.example/a.jpg)](https://l.example/a)\n[![b](https://x.example/b.jpg)](https://l.example/b)",
        Some("https://x.example/b.jpg")
    )]
    #[case::caption_stripped(
        "![cat](https://x.example/cat.gif \"sleepy cat\")",
        Some("https://x.example/cat.gif")
    )]
    #[case::no_markup("Fixes the build on arm64.", None)]
    #[case::link_without_image("[docs](https://docs.example/)", None)]
    #[case::empty_body("", None)]
    fn resolves_the_expected_image(#[case] body: &str, #[case] expected: Option<&str>) {
        let resolved = resolve(body).map(|image| image.url);
        assert_eq!(resolved.as_deref(), expected);
    }

    #[rstest]
    fn matches_do_not_cross_lines() {
        let body = "![a](https://x.example/a.png\n) and ![b](https://x.example/b.png)";
        let resolved = resolve(body).expect("second image is on one line");
        assert_eq!(resolved.url, "https://x.example/b.png");
    }

    #[rstest]
    #[case::upper_case("https://x.example/Cat.PNG", Some("png"))]
    #[case::query_ignored("https://x.example/cat.jpeg?raw=true", Some("jpeg"))]
    #[case::no_extension("https://x.example/cat", None)]
    #[case::not_a_url("cat.png", None)]
    fn format_hint_comes_from_the_path(#[case] url: &str, #[case] expected: Option<&str>) {
        let reference = ImageReference::from_capture(url).expect("capture is not blank");
        assert_eq!(reference.format_hint.as_deref(), expected);
    }

    #[rstest]
    fn blank_capture_is_ignored() {
        assert_eq!(resolve("![blank]( )"), None);
    }
}
