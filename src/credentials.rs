//! Secrets file loading.
//!
//! The file holds one credential per line as `name = value` or `name value`.
//! Blank lines and `#` comments are ignored. Any other line must name a known
//! credential.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::BotError;
use crate::twitter::OAuthCredentials;

/// Default credential file name, resolved against the working directory.
pub const DEFAULT_TOKENS_FILE: &str = "TOKENS";

const CONSUMER_KEY: &str = "twitterConsumerKey";
const CONSUMER_SECRET: &str = "twitterConsumerSecret";
const ACCESS_TOKEN: &str = "twitterAccessToken";
const ACCESS_SECRET: &str = "twitterAccessSecret";
const GITHUB_TOKEN: &str = "githubPersonalAccessToken";

/// Secrets read from the credential file.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth secrets for the publishing account.
    pub twitter: OAuthCredentials,
    /// GitHub token, when the file provides one.
    pub github_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("twitter", &self.twitter)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Default)]
struct Fields {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    access_token: Option<String>,
    access_secret: Option<String>,
    github_token: Option<String>,
}

impl Fields {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            CONSUMER_KEY => Some(&mut self.consumer_key),
            CONSUMER_SECRET => Some(&mut self.consumer_secret),
            ACCESS_TOKEN => Some(&mut self.access_token),
            ACCESS_SECRET => Some(&mut self.access_secret),
            GITHUB_TOKEN => Some(&mut self.github_token),
            _ => None,
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, BotError> {
    value.ok_or_else(|| BotError::MissingCredential {
        name: name.to_owned(),
    })
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = match line.split_once('=') {
        Some(pair) => pair,
        None => line.split_once(char::is_whitespace)?,
    };
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value))
}

/// Parses credential file contents.
///
/// # Errors
///
/// Returns `BotError::MalformedCredential` for lines that do not name a
/// known credential, and `BotError::MissingCredential` when one of the
/// publishing secrets is absent.
///
/// # Example
///
/// ```
/// use cutiebot::credentials::parse;
///
/// let credentials = parse(
///     "twitterConsumerKey = ck\ntwitterConsumerSecret = cs\n\
///      twitterAccessToken = at\ntwitterAccessSecret = as\n",
/// )
/// .expect("all publishing secrets are present");
/// assert!(credentials.github_token.is_none());
/// ```
pub fn parse(contents: &str) -> Result<Credentials, BotError> {
    let mut fields = Fields::default();

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let malformed = || BotError::MalformedCredential {
            line: raw.to_owned(),
        };
        let (name, value) = split_line(line).ok_or_else(malformed)?;
        let slot = fields.slot(name).ok_or_else(malformed)?;
        *slot = Some(value.to_owned());
    }

    Ok(Credentials {
        twitter: OAuthCredentials::new(
            required(fields.consumer_key, CONSUMER_KEY)?,
            required(fields.consumer_secret, CONSUMER_SECRET)?,
            required(fields.access_token, ACCESS_TOKEN)?,
            required(fields.access_secret, ACCESS_SECRET)?,
        ),
        github_token: fields.github_token,
    })
}

/// Reads and parses the credential file at `path`.
///
/// # Errors
///
/// Returns `BotError::Io` when the file cannot be read and parse errors
/// otherwise.
pub fn load(path: &Utf8Path) -> Result<Credentials, BotError> {
    let (dir_path, file_name) = split_path(path)?;
    let dir = Dir::open_ambient_dir(&dir_path, ambient_authority()).map_err(|error| {
        BotError::Io {
            message: format!("failed to open credential directory '{dir_path}': {error}"),
        }
    })?;
    let contents = dir.read_to_string(file_name).map_err(|error| BotError::Io {
        message: format!("failed to read credential file '{path}': {error}"),
    })?;
    parse(&contents)
}

fn split_path(path: &Utf8Path) -> Result<(Utf8PathBuf, &str), BotError> {
    let file_name = path.file_name().ok_or_else(|| BotError::Io {
        message: format!("invalid credential path '{path}': no file name"),
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
    Ok((parent, file_name))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::{load, parse};
    use crate::error::BotError;
    use crate::twitter::OAuthCredentials;

    const COMPLETE: &str = "\
# publishing account
twitterConsumerKey = ck
twitterConsumerSecret=cs

twitterAccessToken at
twitterAccessSecret   =   as
githubPersonalAccessToken = ghp_123
";

    #[rstest]
    fn parses_all_separator_styles() {
        let credentials = parse(COMPLETE).expect("credentials should parse");

        assert_eq!(
            credentials.twitter,
            OAuthCredentials::new("ck", "cs", "at", "as")
        );
        assert_eq!(credentials.github_token.as_deref(), Some("ghp_123"));
    }

    #[rstest]
    #[case::unknown_name("twitterConsumerKey = ck\nfavouriteColour = blue")]
    #[case::missing_value("twitterConsumerKey =")]
    #[case::single_token("twitterConsumerKey")]
    fn bad_lines_are_named(#[case] contents: &str) {
        let error = parse(contents).expect_err("parse should fail");
        let BotError::MalformedCredential { line } = error else {
            panic!("expected MalformedCredential, got {error:?}");
        };
        assert!(contents.contains(&line), "line {line:?} should come from input");
    }

    #[rstest]
    fn missing_publishing_secret_is_reported() {
        let error = parse("twitterConsumerKey = ck\ntwitterConsumerSecret = cs\ntwitterAccessToken = at")
            .expect_err("parse should fail");

        assert_eq!(
            error,
            BotError::MissingCredential {
                name: "twitterAccessSecret".to_owned()
            }
        );
    }

    #[rstest]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().expect("temp file should be created");
        file.write_all(COMPLETE.as_bytes())
            .expect("temp file should be writable");
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf())
            .expect("temp path should be UTF-8");

        let credentials = load(&path).expect("credentials should load");

        assert_eq!(credentials.github_token.as_deref(), Some("ghp_123"));
    }

    #[rstest]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("TOKENS"))
            .expect("temp path should be UTF-8");

        let error = load(&path).expect_err("load should fail");

        assert!(matches!(error, BotError::Io { .. }), "unexpected error: {error:?}");
    }
}
