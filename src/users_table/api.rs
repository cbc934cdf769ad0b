use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use super::model::{NewUser, User};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("proxy answered {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// The calls the table makes against `/api/usuarios`.
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    async fn create(&self, user: &NewUser) -> Result<User, ApiError>;
    async fn update(&self, user: &User) -> Result<User, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct HttpUsersApi {
    http: reqwest::Client,
    collection: Url,
}

impl HttpUsersApi {
    /// `origin` is where the proxy is served, e.g. `http://localhost:8080`.
    pub fn new(origin: &str) -> anyhow::Result<Self> {
        let mut collection = Url::parse(origin.trim_end_matches('/'))
            .with_context(|| format!("invalid proxy origin {origin}"))?;
        collection
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("proxy origin cannot be a base url"))?
            .pop_if_empty()
            .extend(["api", "usuarios"]);
        Ok(Self {
            http: reqwest::Client::new(),
            collection,
        })
    }

    fn resource(&self, id: &str) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url
    }
}

fn check(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = res.status();
    debug!(%status, url = %res.url(), "proxy responded");
    if status.is_success() {
        Ok(res)
    } else {
        Err(ApiError::Status(status))
    }
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    async fn list(&self) -> Result<Vec<User>, ApiError> {
        let res = self.http.get(self.collection.clone()).send().await?;
        Ok(check(res)?.json().await?)
    }

    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let res = self
            .http
            .post(self.collection.clone())
            .json(user)
            .send()
            .await?;
        Ok(check(res)?.json().await?)
    }

    async fn update(&self, user: &User) -> Result<User, ApiError> {
        let res = self
            .http
            .put(self.resource(&user.id))
            .json(user)
            .send()
            .await?;
        Ok(check(res)?.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let res = self.http.delete(self.resource(id)).send().await?;
        check(res)?;
        Ok(())
    }
}
