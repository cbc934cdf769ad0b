use std::sync::Arc;

use crate::config::AppConfig;
use crate::usuarios::services::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(config.microservice_url.clone())?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}
