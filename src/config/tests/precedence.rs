//! Tests for configuration layer precedence.

use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::build_config_from_layers;
use crate::CutieConfig;

#[rstest]
#[case::file_overrides_defaults(
    vec![("defaults", json!({"account": "default-account"})), ("file", json!({"account": "file-account"}))],
    "account",
    "file-account",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![("file", json!({"token": "file-token"})), ("environment", json!({"token": "env-token"}))],
    "token",
    "env-token",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![("environment", json!({"log_level": "debug"})), ("cli", json!({"log_level": "trace"}))],
    "log_level",
    "trace",
    "CLI should override environment"
)]
#[case::repo_defaults_file_env_cli(
    vec![
        ("defaults", json!({"repo": "default-repo"})),
        ("file", json!({"repo": "file-repo"})),
        ("environment", json!({"repo": "env-repo"})),
        ("cli", json!({"repo": "cli-repo"}))
    ],
    "repo",
    "cli-repo",
    "CLI should win for repo"
)]
fn test_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] field: &str,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let config = build_config_from_layers(&layers);

    let actual = match field {
        "account" => Some(config.account.as_str()),
        "token" => config.token.as_deref(),
        "log_level" => Some(config.log_level.as_str()),
        "repo" => Some(config.repo.as_str()),
        _ => panic!("unknown field: {field}"),
    };

    assert_eq!(actual, Some(expected), "{message}");
}

#[rstest]
fn defaults_describe_the_docker_cuties_setup() {
    let config = build_config_from_layers(&[]);

    assert_eq!(config.owner, "moby");
    assert_eq!(config.repo, "moby");
    assert_eq!(config.account, "DockerCuties");
    assert_eq!(config.start_pull, 20_514);
    assert_eq!(config.tokens_file, "TOKENS");
    assert_eq!(config.post_suffix, "#dockercuties #docker");
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.log_level, "warning");
    assert!(config.notify_account.is_none());
    assert!(!config.delete, "delete should default to false when unset");
    assert!(config.pull_to_post.is_none());
}

#[rstest]
fn numeric_fields_load_from_file() {
    let config = build_config_from_layers(&[(
        "file",
        json!({
            "poll_interval_seconds": 5,
            "max_backoff_seconds": 40,
            "http_timeout_seconds": 7,
            "pull_to_post": 31_000
        }),
    )]);

    assert_eq!(config.poll_interval().as_secs(), 5);
    assert_eq!(config.max_backoff().as_secs(), 40);
    assert_eq!(config.http_timeout().as_secs(), 7);
    assert_eq!(config.pull_to_post, Some(31_000));
}

#[rstest]
fn default_struct_matches_merged_defaults() {
    let merged = build_config_from_layers(&[]);
    let built = CutieConfig::default();

    assert_eq!(merged.start_pull, built.start_pull);
    assert_eq!(merged.item_error_policy, built.item_error_policy);
    assert_eq!(merged.twitter_api_base, built.twitter_api_base);
}
