use std::env;
use url::Url;

use crate::error::{CompatError, Result};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10/";
pub const DEFAULT_RATE_LIMIT: f64 = 40.0;

// Values baked in at compile time win over the runtime environment.
macro_rules! setting {
    ($name:literal) => {
        option_env!($name)
            .map(String::from)
            .or_else(|| env::var($name).ok())
            .filter(|v| !v.trim().is_empty())
    };
}

#[derive(Debug, Clone)]
pub struct CompatConfig {
    pub token: String,
    pub application_id: Option<String>,
    pub api_base: Url,
    /// Requests per second across the whole client.
    pub rate_limit: f64,
    /// Sync only this guild instead of every registered scope.
    pub sync_guild_id: Option<u64>,
}

impl CompatConfig {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            token: token.into(),
            application_id: None,
            api_base: Url::parse(DEFAULT_API_BASE)?,
            rate_limit: DEFAULT_RATE_LIMIT,
            sync_guild_id: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        let token = setting!("DISCORD_BOT_TOKEN").ok_or_else(|| {
            CompatError::new("missing_token")
                .push_str("DISCORD_BOT_TOKEN not set at compile time or runtime")
        })?;

        let mut api_base = setting!("DISCORD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        if !api_base.ends_with('/') {
            api_base.push('/');
        }

        let rate_limit = match setting!("DISCORD_RATE_LIMIT") {
            Some(raw) => raw.parse::<f64>().map_err(|e| {
                CompatError::new("invalid_rate_limit")
                    .push_str(format!("DISCORD_RATE_LIMIT={:?}", raw))
                    .push_std(e)
            })?,
            None => DEFAULT_RATE_LIMIT,
        };

        let sync_guild_id = setting!("DISCORD_SYNC_GUILD_ID")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    CompatError::new("invalid_guild_id")
                        .push_str(format!("DISCORD_SYNC_GUILD_ID={:?}", raw))
                        .push_std(e)
                })
            })
            .transpose()?;

        Ok(Self {
            token,
            application_id: setting!("DISCORD_APPLICATION_ID"),
            api_base: Url::parse(&api_base)?,
            rate_limit,
            sync_guild_id,
        })
    }
}
