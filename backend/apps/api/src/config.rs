//! Server configuration from the environment

use anyhow::{Context, bail};
use auth::AuthConfig;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use vote::VoteConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

pub struct ServerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub image_dir: PathBuf,
    pub image_base_url: String,
    pub blocklist_sweep_interval: Duration,
    pub auth: AuthConfig,
    pub vote: VoteConfig,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("{name} is not valid")),
        Err(_) => Ok(default),
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("TOKEN_SECRET") {
        Ok(secret_b64) => {
            let secret = platform::crypto::from_base64(secret_b64.trim())
                .context("TOKEN_SECRET must be base64")?;
            AuthConfig::with_secret(secret).map_err(anyhow::Error::msg)?
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("TOKEN_SECRET not set, using a random secret");
            AuthConfig::with_random_secret()
        }
        Err(_) => bail!("TOKEN_SECRET must be set in production"),
    };

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }
    config.oauth_timeout = Duration::from_secs(parse_var("OAUTH_TIMEOUT_SECS", 5)?);

    Ok(config)
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: var_or("BIND_ADDR", DEFAULT_BIND_ADDR)
                .parse()
                .context("BIND_ADDR is not a socket address")?,
            frontend_origins: var_or("FRONTEND_ORIGINS", DEFAULT_FRONTEND_ORIGINS)
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            image_dir: PathBuf::from(var_or("IMAGE_DIR", "./images")),
            image_base_url: var_or("IMAGE_BASE_URL", "/images"),
            blocklist_sweep_interval: Duration::from_secs(parse_var(
                "BLOCKLIST_SWEEP_SECS",
                3600,
            )?),
            auth: auth_config()?,
            vote: VoteConfig::default(),
        })
    }
}
