use crate::config::HttpConfig;
use ddns_core::Bridge;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<Bridge>,
    pub config: Arc<HttpConfig>,
}

impl AppState {
    pub fn new(bridge: Bridge, config: HttpConfig) -> Self {
        Self {
            bridge: Arc::new(bridge),
            config: Arc::new(config),
        }
    }
}
