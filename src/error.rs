// src/error.rs
use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ChatResponse;
use crate::services::gemini::UpstreamError;

pub const MISSING_USER_MSG: &str = "No se proporcionó 'user_input' en el JSON.";
pub const PROCESSING_ERROR_MSG: &str = "Hubo un error al procesar la pregunta.";
pub const REPHRASE_MSG: &str = "¿Podrías volver a formular tu pregunta?, no entendí bien.";

/// Errors that keep the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read instruction file {}: {source}", path.display())]
    Instruction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-request failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("unreadable request body: {0}")]
    BadRequestBody(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Which endpoint a failure happened on. The two endpoints report errors
/// differently: `/pregunta` uses 400/500, `/ask` always answers 200 with an
/// apology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Pregunta,
    Ask,
}

impl Surface {
    pub fn status_and_message(self, err: &AppError) -> (StatusCode, &'static str) {
        match (self, err) {
            (Surface::Pregunta, AppError::MissingField(_)) => {
                (StatusCode::BAD_REQUEST, MISSING_USER_MSG)
            }
            (Surface::Pregunta, _) => (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR_MSG),
            (Surface::Ask, _) => (StatusCode::OK, REPHRASE_MSG),
        }
    }
}

/// A failure tagged with the endpoint it should be rendered for.
#[derive(Debug)]
pub struct Rejection {
    pub surface: Surface,
    pub error: AppError,
}

impl Rejection {
    pub fn new(surface: Surface, error: impl Into<AppError>) -> Self {
        Self {
            surface,
            error: error.into(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let (status, message) = self.surface.status_and_message(&self.error);
        match &self.error {
            AppError::MissingField(_) => {
                tracing::warn!(surface = ?self.surface, error = %self.error, "rejected request")
            }
            _ => tracing::error!(surface = ?self.surface, error = %self.error, "request failed"),
        }
        let body = Json(ChatResponse {
            response: message.to_string(),
        });
        (status, body).into_response()
    }
}
