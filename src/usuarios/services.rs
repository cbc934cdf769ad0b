use anyhow::Context;
use hyper::ext::ReasonPhrase;
use reqwest::{
    header::{CACHE_CONTROL, CONTENT_TYPE},
    Response, StatusCode, Url,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{error::ProxyError, usuarios::dto::UserInput};

pub const LIST_FAILED: &str = "Error al conectar con el servicio de usuarios";
pub const CREATE_FAILED: &str = "Error al crear el usuario";
pub const UPDATE_FAILED: &str = "Error al actualizar el usuario";
pub const DELETE_FAILED: &str = "Error al eliminar el usuario";

/// How a successful upstream delete is relayed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    NoContent,
    Json(Value),
    Text(String),
}

/// Single-attempt forwarding client for the usuarios microservice.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
}

impl UpstreamClient {
    pub fn new(base: Url) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build upstream http client")?;
        Ok(Self { http, base })
    }

    fn usuarios_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("usuarios");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    pub async fn list(&self) -> Result<Value, ProxyError> {
        let url = self.usuarios_url(None);
        let res = self
            .http
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| transport(LIST_FAILED, &url, e))?;
        let res = ensure_success(res)?;
        res.json::<Value>()
            .await
            .map_err(|e| transport(LIST_FAILED, &url, e))
    }

    pub async fn create(&self, body: &UserInput) -> Result<Value, ProxyError> {
        let url = self.usuarios_url(None);
        let res = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport(CREATE_FAILED, &url, e))?;
        let res = ensure_success(res)?;
        res.json::<Value>()
            .await
            .map_err(|e| transport(CREATE_FAILED, &url, e))
    }

    pub async fn update(&self, id: &str, body: &UserInput) -> Result<Value, ProxyError> {
        let url = self.usuarios_url(Some(id));
        let res = self
            .http
            .put(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport(UPDATE_FAILED, &url, e))?;
        let res = ensure_success(res)?;
        res.json::<Value>()
            .await
            .map_err(|e| transport(UPDATE_FAILED, &url, e))
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, ProxyError> {
        let url = self.usuarios_url(Some(id));
        debug!(%url, "forwarding delete");
        let res = self
            .http
            .delete(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| transport_detailed(DELETE_FAILED, &url, e))?;

        let status = res.status();
        info!(%status, "upstream delete responded");

        if !status.is_success() {
            let reason = status_text(&res);
            // Error bodies are not guaranteed to be JSON.
            let details = res
                .text()
                .await
                .map_err(|e| transport_detailed(DELETE_FAILED, &url, e))?;
            warn!(%status, %details, "upstream rejected delete");
            return Err(ProxyError::upstream_with_details(status, reason, details));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(DeleteOutcome::NoContent);
        }

        if is_json(&res) {
            let body = res
                .json::<Value>()
                .await
                .map_err(|e| transport_detailed(DELETE_FAILED, &url, e))?;
            Ok(DeleteOutcome::Json(body))
        } else {
            let text = res
                .text()
                .await
                .map_err(|e| transport_detailed(DELETE_FAILED, &url, e))?;
            Ok(DeleteOutcome::Text(text))
        }
    }
}

fn ensure_success(res: Response) -> Result<Response, ProxyError> {
    let status = res.status();
    if status.is_success() {
        info!(%status, url = %res.url(), "upstream responded");
        Ok(res)
    } else {
        warn!(%status, url = %res.url(), "upstream returned error status");
        Err(ProxyError::upstream(status, status_text(&res)))
    }
}

/// The reason phrase upstream actually sent. hyper only records it when it
/// differs from the canonical one, so fall back to that, then to the code.
fn status_text(res: &Response) -> String {
    let status = res.status();
    res.extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.as_u16().to_string())
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

fn transport(message: &'static str, url: &Url, e: reqwest::Error) -> ProxyError {
    error!(error = %e, %url, "upstream call failed");
    ProxyError::transport(message, e)
}

fn transport_detailed(message: &'static str, url: &Url, e: reqwest::Error) -> ProxyError {
    error!(error = %e, %url, "upstream call failed");
    ProxyError::transport_detailed(message, e)
}
