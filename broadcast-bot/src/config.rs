//! Bot configuration, loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::Result;

/// Runtime configuration. Everything except the token has a default.
pub struct BotConfig {
    pub bot_token: String,
    /// Directory holding messages.json, groups.json, admins.json.
    pub data_dir: String,
    pub log_file: String,
    /// Delay between group sends during a broadcast.
    pub broadcast_pause_ms: u64,
    /// Auto-broadcast tick period.
    pub auto_interval_secs: u64,
}

impl BotConfig {
    /// Loads config from the environment. A token passed on the command line
    /// takes precedence over `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/broadcast-bot.log".to_string());
        let broadcast_pause_ms = env::var("BROADCAST_PAUSE_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500);
        let auto_interval_secs = env::var("AUTO_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            bot_token,
            data_dir,
            log_file,
            broadcast_pause_ms,
            auto_interval_secs,
        })
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.broadcast_pause_ms)
    }

    pub fn auto_interval(&self) -> Duration {
        Duration::from_secs(self.auto_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var("BOT_TOKEN");
        env::remove_var("DATA_DIR");
        env::remove_var("LOG_FILE");
        env::remove_var("BROADCAST_PAUSE_MS");
        env::remove_var("AUTO_INTERVAL_SECS");
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", "test_token");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.log_file, "logs/broadcast-bot.log");
        assert_eq!(config.broadcast_pause_ms, 500);
        assert_eq!(config.auto_interval_secs, 60);
        assert_eq!(config.pacing(), Duration::from_millis(500));
        assert_eq!(config.auto_interval(), Duration::from_secs(60));
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        clear_env();
        env::set_var("BOT_TOKEN", "custom_token");
        env::set_var("DATA_DIR", "/tmp/bcast");
        env::set_var("LOG_FILE", "/tmp/bcast.log");
        env::set_var("BROADCAST_PAUSE_MS", "100");
        env::set_var("AUTO_INTERVAL_SECS", "5");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.data_dir, "/tmp/bcast");
        assert_eq!(config.log_file, "/tmp/bcast.log");
        assert_eq!(config.broadcast_pause_ms, 100);
        assert_eq!(config.auto_interval_secs, 5);
    }

    #[test]
    #[serial]
    fn test_load_config_with_override_token() {
        clear_env();
        env::set_var("BOT_TOKEN", "env_token");

        let config = BotConfig::load(Some("override_token".to_string())).unwrap();
        assert_eq!(config.bot_token, "override_token");
    }

    #[test]
    #[serial]
    fn test_load_config_missing_token_fails() {
        clear_env();
        assert!(BotConfig::load(None).is_err());
    }
}
