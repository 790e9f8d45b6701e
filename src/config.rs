use anyhow::Context;
use serde::Deserialize;

/// Credentials for provisioning an administrator at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub superuser: Option<SuperuserConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let superuser = std::env::var("SUPERUSER_EMAIL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|email| SuperuserConfig {
                email,
                password: std::env::var("SUPERUSER_PASSWORD").ok(),
            });
        Ok(Self {
            database_url,
            max_connections,
            superuser,
        })
    }
}
