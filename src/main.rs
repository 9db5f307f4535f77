//! Cutiebot entrypoint: polls for pull request cuties, posts a single pull
//! request, or wipes the publishing account.

use std::io::{self, Write};
use std::process::ExitCode;

use cutiebot::cutie::HttpImageFetcher;
use cutiebot::github::{OctocrabGateway, PersonalAccessToken};
use cutiebot::twitter::TwitterGateway;
use cutiebot::{
    BotError, BotSettings, CutieBot, CutieConfig, Outcome, RunMode, credentials, telemetry,
};
use ortho_config::OrthoConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BotError> {
    let config = load_config()?;
    config.validate()?;
    telemetry::init(&config.log_level)?;

    let credentials = credentials::load(&config.tokens_path())?;
    let token = PersonalAccessToken::new(config.resolve_token(&credentials)?)?;
    let locator = config.locator()?;

    let github = OctocrabGateway::with_timeout(&token, &locator, config.http_timeout())?;
    let publisher = TwitterGateway::new(credentials.twitter, config.http_timeout())?
        .with_bases(&config.twitter_api_base, &config.twitter_upload_base)?;
    let fetcher = HttpImageFetcher::new(config.http_timeout())?;
    let settings = BotSettings::from_config(&config)?;
    let mut bot = CutieBot::new(github, publisher, fetcher, locator, settings);

    match config.run_mode() {
        RunMode::WipeAccount => {
            let deleted = bot.wipe_account().await?;
            info!(deleted, account = %config.account, "account wiped");
        }
        RunMode::PostSingle(number) => match bot.post_single(number).await {
            Ok(Outcome::Posted(post)) => info!(id = post.id, number, "posted"),
            Ok(Outcome::Empty) => warn!(number, "normalised image is empty, nothing posted"),
            Err(error) if error.is_skippable() => warn!(number, %error, "nothing posted"),
            Err(error) => return Err(error),
        },
        RunMode::Poll => {
            info!(
                repository = %config.owner,
                name = %config.repo,
                account = %config.account,
                "polling for cuties"
            );
            bot.run_until(shutdown_signal()).await;
        }
    }
    Ok(())
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`BotError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<CutieConfig, BotError> {
    CutieConfig::load().map_err(|error| BotError::Configuration {
        message: error.to_string(),
    })
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "cannot listen for interrupt; stopping");
    }
}
