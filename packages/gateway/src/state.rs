use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::forward::ModelForwarder;

pub type AppState = Arc<GatewayState>;

#[derive(Debug, Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub forwarder: ModelForwarder,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Self {
        let forwarder = ModelForwarder::new(config.model_addr.clone());
        Self { config, forwarder }
    }
}
