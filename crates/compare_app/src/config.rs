//! Command line and config file handling.
//!
//! Precedence: command line flag, then config file value, then default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use compare_client::{ApiLayout, ClientSettings, Credentials};
use compare_core::ControllerOptions;
use log::LevelFilter;
use serde::Deserialize;

use crate::platform::logging::LogDestination;

const DEFAULT_STATE_FILE: &str = ".compare_session.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutName {
    /// `/start_search`, `/get_messages`, `/stop_search`, `/save_search`
    Flat,
    /// `/search/start`, `/search/{id}/messages`, ...
    SessionScoped,
}

impl From<LayoutName> for ApiLayout {
    fn from(name: LayoutName) -> Self {
        match name {
            LayoutName::Flat => ApiLayout::Flat,
            LayoutName::SessionScoped => ApiLayout::SessionScoped,
        }
    }
}

#[derive(Debug, Parser, Clone, Default)]
#[command(
    name = "price-compare",
    version,
    about = "Terminal client for the price comparison search server"
)]
pub struct Cli {
    /// Base URL of the search server
    #[arg(long)]
    pub server: Option<String>,

    /// Endpoint family the server exposes
    #[arg(long, value_enum)]
    pub layout: Option<LayoutName>,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Bearer token sent with every request
    #[arg(long, env = "PRICE_COMPARE_TOKEN")]
    pub token: Option<String>,

    /// Log in with this user before the first request
    #[arg(long)]
    pub username: Option<String>,

    /// Password for --username
    #[arg(long, env = "PRICE_COMPARE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Where the session snapshot is kept between runs
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Log destination
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Log debug records as well
    #[arg(long)]
    pub verbose: bool,

    /// RON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Leave Search disabled after a failed start, as the first server release did
    #[arg(long)]
    pub keep_search_disabled: bool,
}

/// Optional settings read from a RON file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: Option<String>,
    pub layout: Option<LayoutName>,
    pub poll_interval_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub state_file: Option<PathBuf>,
    pub log: Option<LogDestination>,
    pub reenable_on_start_failure: Option<bool>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub client: ClientSettings,
    /// When set, a login replaces any configured token.
    pub credentials: Option<Credentials>,
    pub options: ControllerOptions,
    pub state_file: PathBuf,
    pub log: LogDestination,
    pub log_level: LevelFilter,
}

pub fn resolve(cli: Cli) -> Result<ResolvedConfig> {
    let file = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    merge(cli, file)
}

fn merge(cli: Cli, file: AppConfig) -> Result<ResolvedConfig> {
    let defaults = ClientSettings::default();
    let millis = |value: Option<u64>, fallback: Duration| {
        value.map(Duration::from_millis).unwrap_or(fallback)
    };

    let client = ClientSettings {
        base_url: cli.server.or(file.server).unwrap_or(defaults.base_url),
        layout: cli
            .layout
            .or(file.layout)
            .map(ApiLayout::from)
            .unwrap_or(defaults.layout),
        poll_interval: millis(
            cli.poll_interval.or(file.poll_interval_ms),
            defaults.poll_interval,
        ),
        connect_timeout: millis(file.connect_timeout_ms, defaults.connect_timeout),
        request_timeout: millis(file.request_timeout_ms, defaults.request_timeout),
        bearer_token: cli.token.or(file.token),
    };

    let credentials = match (cli.username.or(file.username), cli.password.or(file.password)) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        (Some(_), None) => {
            bail!("--username needs a password (--password or PRICE_COMPARE_PASSWORD)")
        }
        (None, _) => None,
    };

    let reenable = if cli.keep_search_disabled {
        false
    } else {
        file.reenable_on_start_failure
            .unwrap_or(ControllerOptions::default().reenable_on_start_failure)
    };

    Ok(ResolvedConfig {
        options: ControllerOptions {
            reenable_on_start_failure: reenable,
            require_session_id: client.layout == ApiLayout::SessionScoped,
        },
        client,
        credentials,
        state_file: cli
            .state_file
            .or(file.state_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
        log: cli.log.or(file.log).unwrap_or_default(),
        log_level: if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    })
}
