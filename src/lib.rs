//! Cutiebot library crate: publishes the animal pictures contributors embed
//! in GitHub pull request descriptions.
//!
//! The bot polls a repository for pull requests opened since the last one it
//! published, extracts the picture from each description, normalises it to
//! the upload limit, and posts it with a permalink to the pull request.
//! Gateways for GitHub and the publishing account sit behind traits so the
//! orchestrator in [`bot`] can be exercised with mocks.

pub mod bot;
pub mod config;
pub mod credentials;
pub mod cutie;
pub mod error;
pub mod github;
pub mod posted;
pub mod telemetry;
pub mod twitter;

pub use bot::{BotSettings, CutieBot, Outcome};
pub use config::{CutieConfig, RunMode};
pub use error::BotError;
