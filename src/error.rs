use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::usuarios::dto::ErrorBody;

/// Failures of a single proxied call. Every variant renders as a JSON error
/// payload, so nothing escapes a handler unformatted.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The microservice answered with a non-2xx status.
    #[error("Error del microservicio: {status_text}")]
    Upstream {
        status: StatusCode,
        status_text: String,
        details: Option<String>,
    },

    /// Network failure, malformed request body or undecodable upstream body.
    /// `message` is the fixed per-operation text shown to callers.
    #[error("{message}: {cause}")]
    Transport {
        message: &'static str,
        cause: String,
        expose_details: bool,
    },
}

impl ProxyError {
    /// `status_text` is the reason phrase upstream sent on its status line.
    pub fn upstream(status: StatusCode, status_text: String) -> Self {
        Self::Upstream {
            status,
            status_text,
            details: None,
        }
    }

    pub fn upstream_with_details(status: StatusCode, status_text: String, details: String) -> Self {
        Self::Upstream {
            status,
            status_text,
            details: Some(details),
        }
    }

    pub fn transport(message: &'static str, cause: impl ToString) -> Self {
        Self::Transport {
            message,
            cause: cause.to_string(),
            expose_details: false,
        }
    }

    /// Like [`ProxyError::transport`] but the cause is echoed back in `details`.
    pub fn transport_detailed(message: &'static str, cause: impl ToString) -> Self {
        Self::Transport {
            message,
            cause: cause.to_string(),
            expose_details: true,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Upstream {
                status_text,
                details,
                ..
            } => ErrorBody {
                error: format!("Error del microservicio: {status_text}"),
                details,
            },
            Self::Transport {
                message,
                cause,
                expose_details,
            } => ErrorBody {
                error: message.to_string(),
                details: expose_details.then_some(cause),
            },
        };
        (status, Json(body)).into_response()
    }
}
