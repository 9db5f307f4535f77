//! Shared test helpers for configuration tests.

use ortho_config::MergeComposer;
use serde_json::{Value, json};

use crate::CutieConfig;
use crate::credentials::Credentials;
use crate::twitter::OAuthCredentials;

/// Applies a configuration layer to the composer based on the layer type.
pub fn apply_layer(composer: &mut MergeComposer, layer_type: &str, value: Value) {
    match layer_type {
        "defaults" => composer.push_defaults(value),
        "file" => composer.push_file(value, None),
        "environment" => composer.push_environment(value),
        "cli" => composer.push_cli(value),
        _ => panic!("unknown layer type: {layer_type}"),
    }
}

/// Helper to compose a [`CutieConfig`] from a sequence of `(layer_type, value)` pairs.
pub fn build_config_from_layers(layers: &[(&str, Value)]) -> CutieConfig {
    let mut composer = MergeComposer::new();
    composer.push_defaults(json!({}));

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value.clone());
    }

    CutieConfig::merge_from_layers(composer.layers()).expect("merge should succeed")
}

/// Credentials with an optional GitHub token.
pub fn credentials(github_token: Option<&str>) -> Credentials {
    Credentials {
        twitter: OAuthCredentials::new("ck", "cs", "at", "as"),
        github_token: github_token.map(str::to_owned),
    }
}
