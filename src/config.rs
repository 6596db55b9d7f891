use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub api_rps: u32,
    pub mail_relay_url: String,
    pub mail_relay_token: Option<String>,
    pub mail_from_address: String,
    pub mail_from_name: String,
    pub outbox_max_attempts: i32,
    /// Six-field cron expression (seconds first) driving the reminder sweep.
    pub reminder_cron: String,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
            jwt_secret: get_env("JWT_SECRET")?,
            api_rps: get_env_parse_or("API_RPS", 50)?,
            mail_relay_url: get_env("MAIL_RELAY_URL")?,
            mail_relay_token: env::var("MAIL_RELAY_TOKEN").ok().filter(|t| !t.is_empty()),
            mail_from_address: get_env("MAIL_FROM_ADDRESS")?,
            mail_from_name: get_env("MAIL_FROM_NAME")?,
            outbox_max_attempts: get_env_parse_or("OUTBOX_MAX_ATTEMPTS", 5)?,
            reminder_cron: env::var("REMINDER_CRON").unwrap_or_else(|_| "0 * * * * *".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            log_format: parse_log_format(env::var("LOG_FORMAT").ok().as_deref())?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("pretty") => Ok(LogFormat::Pretty),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(Error::Config(format!("Invalid value for LOG_FORMAT: {}", other))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
