use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct SiteWatchConfig {
    pub check_url: String,
    pub bot_token: String,

    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_encryption_key")]
    pub encryption_key: String,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Public URL to register with the bot API when running in webhook mode.
    #[serde(default)]
    pub public_webhook_url: Option<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialConfig {
    check_url: Option<String>,
    bot_token: Option<String>,
    check_interval_seconds: Option<u64>,
    request_timeout_seconds: Option<u64>,
    max_consecutive_errors: Option<u32>,
    accept_invalid_certs: Option<bool>,
    listen_addr: Option<String>,
    data_dir: Option<String>,
    log_dir: Option<String>,
    encryption_key: Option<String>,
    retention_days: Option<i64>,
    public_webhook_url: Option<String>,
}

fn default_check_interval() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_consecutive_errors() -> u32 {
    3
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_encryption_key() -> String {
    // This key is for development convenience.
    // It's crucial to override this in production via environment variables.
    "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f".to_string()
}

fn default_retention_days() -> i64 {
    30
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    match env_string(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid value for {key}: {raw}")),
        None => Ok(None),
    }
}

impl SiteWatchConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialConfig::default()
            }
        } else {
            PartialConfig::default()
        };

        // 2. Load from environment variables
        let env_config = PartialConfig {
            check_url: env_string("CHECK_URL"),
            // TOKEN is the variable the original deployment contract uses.
            bot_token: env_string("BOT_TOKEN").or_else(|| env_string("TOKEN")),
            check_interval_seconds: env_parsed("CHECK_INTERVAL_SECONDS")?
                .map(Some)
                .unwrap_or(env_parsed("CHECK_INTERVAL")?),
            request_timeout_seconds: env_parsed("REQUEST_TIMEOUT_SECONDS")?,
            max_consecutive_errors: env_parsed("MAX_CONSECUTIVE_ERRORS")?,
            accept_invalid_certs: env_parsed("ACCEPT_INVALID_CERTS")?,
            listen_addr: env_string("LISTEN_ADDR"),
            data_dir: env_string("DATA_DIR"),
            log_dir: env_string("LOG_DIR"),
            encryption_key: env_string("ENCRYPTION_KEY"),
            retention_days: env_parsed("RETENTION_DAYS")?,
            public_webhook_url: env_string("PUBLIC_WEBHOOK_URL"),
        };

        // 3. Merge: environment overrides file
        let final_config = SiteWatchConfig {
            check_url: env_config
                .check_url
                .or(file_config.check_url)
                .ok_or("CHECK_URL is required")?,
            bot_token: env_config
                .bot_token
                .or(file_config.bot_token)
                .ok_or("TOKEN is required")?,
            check_interval_seconds: env_config
                .check_interval_seconds
                .or(file_config.check_interval_seconds)
                .unwrap_or_else(default_check_interval),
            request_timeout_seconds: env_config
                .request_timeout_seconds
                .or(file_config.request_timeout_seconds)
                .unwrap_or_else(default_request_timeout),
            max_consecutive_errors: env_config
                .max_consecutive_errors
                .or(file_config.max_consecutive_errors)
                .unwrap_or_else(default_max_consecutive_errors),
            accept_invalid_certs: env_config
                .accept_invalid_certs
                .or(file_config.accept_invalid_certs)
                .unwrap_or(false),
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            data_dir: env_config
                .data_dir
                .or(file_config.data_dir)
                .unwrap_or_else(default_data_dir),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            encryption_key: env_config
                .encryption_key
                .or(file_config.encryption_key)
                .unwrap_or_else(default_encryption_key),
            retention_days: env_config
                .retention_days
                .or(file_config.retention_days)
                .unwrap_or_else(default_retention_days),
            public_webhook_url: env_config
                .public_webhook_url
                .or(file_config.public_webhook_url),
        };

        if final_config.check_interval_seconds == 0 {
            return Err("check_interval_seconds must be greater than zero".to_string());
        }

        Ok(final_config)
    }
}
