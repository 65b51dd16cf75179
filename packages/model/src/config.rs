use std::env;
use std::net::SocketAddr;

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub host: String,
    pub port: u16,
}

impl ModelConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ModelConfig {
            host: env::var("MODEL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("MODEL_PORT")
                .unwrap_or_else(|_| "50051".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MODEL_PORT".to_string()))?,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MODEL_HOST".to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
