// src/routes/chat.rs
use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State, rejection::JsonRejection},
    http::header::CONTENT_TYPE,
    response::Html,
};
use serde_json::Value;

use crate::{
    error::{AppError, Rejection, Surface},
    message::{AskForm, ChatResponse, user_from_json},
    services::gemini::UpstreamError,
    state::SharedState,
};

const INDEX_HTML: &str = include_str!("../../public/index.html");
const USER_INPUT_FIELD: &str = "user_input";

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// JSON endpoint: `{"user": "..."}`.
pub async fn pregunta_handler(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, Rejection> {
    let reject = |e: AppError| Rejection::new(Surface::Pregunta, e);

    let Json(body) = payload.map_err(|e| reject(AppError::BadRequestBody(e.body_text())))?;
    let user_input = user_from_json(body).map_err(reject)?;

    let reply = relay(&state, &user_input)
        .await
        .map_err(|e| reject(e.into()))?;
    Ok(Json(ChatResponse { response: reply }))
}

/// Form endpoint: `user_input=...`, url-encoded or multipart.
pub async fn ask_handler(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Json<ChatResponse>, Rejection> {
    let reject = |e: AppError| Rejection::new(Surface::Ask, e);

    let user_input = read_user_input(request).await.map_err(reject)?;

    let reply = relay(&state, &user_input)
        .await
        .map_err(|e| reject(e.into()))?;
    Ok(Json(ChatResponse { response: reply }))
}

async fn read_user_input(request: Request) -> Result<String, AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let Form(form) = Form::<AskForm>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequestBody(e.body_text()))?;
        return form
            .user_input
            .ok_or(AppError::MissingField(USER_INPUT_FIELD));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequestBody(e.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequestBody(e.body_text()))?
    {
        // File uploads are not form values.
        if field.name() == Some(USER_INPUT_FIELD) && field.file_name().is_none() {
            return field
                .text()
                .await
                .map_err(|e| AppError::BadRequestBody(e.body_text()));
        }
    }
    Err(AppError::MissingField(USER_INPUT_FIELD))
}

async fn relay(state: &SharedState, user_input: &str) -> Result<String, UpstreamError> {
    tracing::info!(user = %user_input, "user message");
    let reply = state
        .session
        .send_message(&state.full_prompt(user_input))
        .await?;
    tracing::info!(bot = %reply, "bot reply");
    Ok(reply)
}
