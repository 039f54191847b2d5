use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use forgeline_core::AppError;

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(self.api_host.as_str()).map_err(|_| {
            AppError::Validation(format!("API_HOST '{}' is not a valid address", self.api_host))
        })?;

        Ok(SocketAddr::new(host, self.api_port))
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} must be set")))
}
