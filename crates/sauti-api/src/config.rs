use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration, collected from the environment once at startup
/// and passed to components at construction. No module-level state.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    /// Base URL clients use to reach this server, for building file URLs.
    pub public_base_url: String,
    /// Phone number notified when a voice note is analyzed. Optional; the
    /// notification step is skipped when unset.
    pub sos_alert_number: Option<String>,
    pub groq_api_key: String,
    pub groq_model: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port: u16 = env_or("SAUTI_PORT", "8000")
            .parse()
            .context("SAUTI_PORT must be a port number")?;
        let token_ttl_minutes: i64 = env_or("SAUTI_TOKEN_TTL_MINUTES", "60")
            .parse()
            .context("SAUTI_TOKEN_TTL_MINUTES must be an integer")?;

        let host = env_or("SAUTI_HOST", "0.0.0.0");
        let public_base_url =
            env_or("SAUTI_PUBLIC_URL", &format!("http://{}:{}", host, port));

        Ok(Self {
            jwt_secret: env_or("SAUTI_JWT_SECRET", "dev-secret-change-me"),
            token_ttl_minutes,
            db_path: PathBuf::from(env_or("SAUTI_DB_PATH", "sauti.db")),
            host,
            port,
            upload_dir: PathBuf::from(env_or("SAUTI_UPLOAD_DIR", "uploads")),
            public_base_url,
            sos_alert_number: std::env::var("SAUTI_SOS_ALERT_NUMBER")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            groq_api_key: env_or("GROQ_API_KEY", ""),
            groq_model: env_or("GROQ_MODEL", sauti_providers::llm::DEFAULT_MODEL),
            twilio_account_sid: env_or("TWILIO_ACCOUNT_SID", ""),
            twilio_auth_token: env_or("TWILIO_AUTH_TOKEN", ""),
            twilio_from_number: env_or("TWILIO_FROM_NUMBER", ""),
        })
    }
}
