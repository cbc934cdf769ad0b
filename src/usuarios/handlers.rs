use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    error::ProxyError,
    state::AppState,
    usuarios::{
        dto::{MessageBody, UserInput},
        services::{DeleteOutcome, CREATE_FAILED, UPDATE_FAILED},
    },
};

pub fn usuarios_routes() -> Router<AppState> {
    Router::new()
        .route("/usuarios", get(list_usuarios).post(create_usuario))
        .route("/usuarios/:id", put(update_usuario).delete(delete_usuario))
}

#[instrument(skip(state))]
pub async fn list_usuarios(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let data = state.upstream.list().await?;
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(data)).into_response())
}

#[instrument(skip(state, payload))]
pub async fn create_usuario(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<Json<Value>, ProxyError> {
    let body = parse_body(CREATE_FAILED, &payload)?;
    let created = state.upstream.create(&body).await?;
    info!(nombre = %body.nombre, "usuario created");
    Ok(Json(created))
}

#[instrument(skip(state, payload))]
pub async fn update_usuario(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Bytes,
) -> Result<Json<Value>, ProxyError> {
    let body = parse_body(UPDATE_FAILED, &payload)?;
    let updated = state.upstream.update(&id, &body).await?;
    info!(%id, "usuario updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_usuario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ProxyError> {
    let outcome = state.upstream.delete(&id).await?;
    info!(%id, "usuario deleted");
    Ok(outcome.into_response())
}

impl IntoResponse for DeleteOutcome {
    fn into_response(self) -> Response {
        match self {
            DeleteOutcome::NoContent => StatusCode::NO_CONTENT.into_response(),
            DeleteOutcome::Json(body) => Json(body).into_response(),
            DeleteOutcome::Text(message) => Json(MessageBody { message }).into_response(),
        }
    }
}

// The body is parsed as JSON whatever Content-Type the caller sent.
fn parse_body(message: &'static str, payload: &[u8]) -> Result<UserInput, ProxyError> {
    serde_json::from_slice(payload).map_err(|e| {
        warn!(error = %e, "rejected request body");
        ProxyError::transport(message, e)
    })
}
