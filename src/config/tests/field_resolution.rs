//! Tests for field resolution methods (`resolve_token`, `locator`,
//! `item_policy`, `run_mode`).

use rstest::rstest;

use super::helpers::credentials;
use crate::CutieConfig;
use crate::config::RunMode;
use crate::error::BotError;
use crate::github::VisitErrorPolicy;

#[rstest]
fn resolve_token_prefers_configured_value() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("env-token"))]);
    let config = CutieConfig {
        token: Some("my-token".to_owned()),
        ..Default::default()
    };

    let result = config.resolve_token(&credentials(Some("file-token")));
    assert_eq!(result.ok(), Some("my-token".to_owned()));
}

#[rstest]
fn resolve_token_falls_back_to_environment() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("env-token"))]);
    let config = CutieConfig::default();

    let result = config.resolve_token(&credentials(Some("file-token")));
    assert_eq!(result.ok(), Some("env-token".to_owned()));
}

#[rstest]
fn resolve_token_falls_back_to_credential_file() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
    let config = CutieConfig::default();

    let result = config.resolve_token(&credentials(Some("file-token")));
    assert_eq!(result.ok(), Some("file-token".to_owned()));
}

#[rstest]
fn resolve_token_returns_error_when_none() {
    let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
    let config = CutieConfig::default();

    let result = config.resolve_token(&credentials(None));
    assert_eq!(result, Err(BotError::MissingToken));
}

#[rstest]
#[case::abort("abort", VisitErrorPolicy::Abort)]
#[case::skip("skip", VisitErrorPolicy::Skip)]
#[case::mixed_case(" Skip ", VisitErrorPolicy::Skip)]
fn item_policy_parses_known_values(#[case] value: &str, #[case] expected: VisitErrorPolicy) {
    let config = CutieConfig {
        item_error_policy: value.to_owned(),
        ..Default::default()
    };

    assert_eq!(config.item_policy(), Ok(expected));
}

#[rstest]
fn locator_uses_configured_api_base() {
    let config = CutieConfig {
        owner: "docker".to_owned(),
        repo: "compose".to_owned(),
        github_api_base: Some("http://127.0.0.1:8080".to_owned()),
        ..Default::default()
    };

    let locator = config.locator().expect("locator should build");
    assert_eq!(locator.full_name(), "docker/compose");
    assert_eq!(locator.api_base().as_str(), "http://127.0.0.1:8080/");
}

#[rstest]
#[case::poll(CutieConfig::default(), RunMode::Poll)]
#[case::single(CutieConfig { pull_to_post: Some(20_600), ..Default::default() }, RunMode::PostSingle(20_600))]
#[case::wipe(CutieConfig { delete: true, ..Default::default() }, RunMode::WipeAccount)]
fn run_mode_follows_flags(#[case] config: CutieConfig, #[case] expected: RunMode) {
    assert_eq!(config.run_mode(), expected);
}
