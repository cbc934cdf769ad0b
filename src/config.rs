use anyhow::Context;
use reqwest::Url;

pub const DEFAULT_MICROSERVICE_URL: &str =
    "http://service-microservicio-2.pluaj-dev-dev.svc.cluster.local:8082";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the usuarios microservice, without the `/usuarios` suffix.
    pub microservice_url: Url,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = std::env::var("MICROSERVICE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MICROSERVICE_URL.into());
        let microservice_url = parse_base_url(&raw)?;

        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        Ok(Self::new(microservice_url, host, port))
    }

    /// Builds a config without touching the environment, for embedding the
    /// proxy against a known upstream. Port 0 binds an ephemeral port.
    pub fn new(microservice_url: Url, host: impl Into<String>, port: u16) -> Self {
        Self {
            microservice_url,
            host: host.into(),
            port,
        }
    }
}

/// Parses the upstream base URL, dropping any trailing slash so path
/// segments can be appended uniformly.
pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).with_context(|| format!("invalid MICROSERVICE_URL {trimmed}"))?;
    anyhow::ensure!(
        !url.cannot_be_a_base(),
        "MICROSERVICE_URL must be an absolute http(s) url"
    );
    Ok(url)
}
