use crate::error::{ConfigError, ForwarderError};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_SUBREDDIT: &str = "nba";
const DEFAULT_LIMIT: u32 = 25;
const DEFAULT_CHAR_LIMIT: usize = 200;
const DEFAULT_STATE_FILE: &str = "state_reddit_ids.json";
const DEFAULT_USER_AGENT: &str = "redgram/0.1 (reddit-to-telegram forwarder)";

/// Listing sort mode. Reddit exposes these as distinct listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Hot,
    New,
    Top,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Hot => "hot",
            SortMode::New => "new",
            SortMode::Top => "top",
        }
    }
}

impl FromStr for SortMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(SortMode::Hot),
            "new" => Ok(SortMode::New),
            "top" => Ok(SortMode::Top),
            other => Err(ConfigError::InvalidValue {
                field: "LISTING".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Process-wide configuration, read once at startup. Required values are
/// validated for presence before the cycle makes any network call.
#[derive(Debug, Clone)]
pub struct Config {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub bot_token: String,
    pub chat_id: String,
    pub subreddit: String,
    pub sort: SortMode,
    pub fetch_limit: u32,
    pub char_limit: usize,
    pub state_file: PathBuf,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ForwarderError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Split out from `from_env`
    /// so validation is testable without mutating process environment.
    pub fn from_vars<F>(get: F) -> Result<Self, ForwarderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            get(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnvironmentVariable {
                    var_name: name.to_string(),
                })
        };

        let reddit_client_id = require("REDDIT_CLIENT_ID")?;
        let reddit_client_secret = require("REDDIT_CLIENT_SECRET")?;
        let bot_token = require("BOT_TOKEN")?;
        let chat_id = require("CHAT_ID")?;

        let subreddit = get("SUBREDDIT").unwrap_or_else(|| DEFAULT_SUBREDDIT.to_string());
        let sort = match get("LISTING") {
            Some(value) => value.parse::<SortMode>()?,
            None => SortMode::Hot,
        };
        let fetch_limit = parse_number(&get, "LIMIT", DEFAULT_LIMIT)?;
        let char_limit = parse_number(&get, "CHAR_LIMIT", DEFAULT_CHAR_LIMIT)?;
        let state_file = get("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
        let user_agent = get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            reddit_client_id,
            reddit_client_secret,
            bot_token,
            chat_id,
            subreddit,
            sort,
            fetch_limit,
            char_limit,
            state_file,
            user_agent,
        })
    }
}

fn parse_number<F, T>(get: &F, name: &str, default: T) -> Result<T, ForwarderError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match get(name) {
        Some(value) => value.parse::<T>().map_err(|_| {
            ForwarderError::Config(ConfigError::InvalidValue {
                field: name.to_string(),
                value,
            })
        }),
        None => Ok(default),
    }
}
