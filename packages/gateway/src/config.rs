use std::env;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Port for REST and batched-RPC
    pub http_port: u16,
    /// Port for the gRPC passthrough
    pub grpc_port: u16,
    /// host:port of the model service
    pub model_addr: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            http_port: env::var("API_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("API_PORT".to_string()))?,
            grpc_port: env::var("API_GRPC_PORT")
                .unwrap_or_else(|_| "50052".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("API_GRPC_PORT".to_string()))?,
            model_addr: env::var("MODEL_ADDR").unwrap_or_else(|_| "127.0.0.1:50051".to_string()),
        })
    }

    pub fn http_bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }

    pub fn grpc_bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.grpc_port)
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
