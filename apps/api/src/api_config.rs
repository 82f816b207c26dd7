use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use assent_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Runtime configuration loaded from the environment at startup.
///
/// The client API key and the identity-provider userinfo endpoint are
/// deployment configuration, never caller input.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub client_api_key: String,
    pub userinfo_url: String,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let client_api_key = required_env("CLIENT_API_KEY")?;
        if client_api_key.len() < 16 {
            return Err(AppError::Validation(
                "CLIENT_API_KEY must be at least 16 characters".to_owned(),
            ));
        }

        let userinfo_url = required_env("USERINFO_URL")?;
        Url::parse(userinfo_url.as_str())
            .map_err(|error| AppError::Validation(format!("invalid USERINFO_URL: {error}")))?;

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            client_api_key,
            userinfo_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(self.api_host.as_str()).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
