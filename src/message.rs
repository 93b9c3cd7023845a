// src/message.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

pub const USER_KEY: &str = "user";

/// Pull the user's text out of a `POST /pregunta` body.
///
/// Only a body where `user` cannot be found at all counts as a missing
/// field: an object without the key, an array without the string `"user"`,
/// or a bare string that doesn't contain it. Anything else without a string
/// `user` is unreadable.
pub fn user_from_json(body: Value) -> Result<String, AppError> {
    match body {
        Value::Object(mut map) => match map.remove(USER_KEY) {
            Some(Value::String(user)) => Ok(user),
            Some(other) => Err(AppError::BadRequestBody(format!(
                "'{USER_KEY}' is not a string: {other}"
            ))),
            None => Err(AppError::MissingField(USER_KEY)),
        },
        Value::Array(items) if !items.iter().any(|v| v.as_str() == Some(USER_KEY)) => {
            Err(AppError::MissingField(USER_KEY))
        }
        Value::String(text) if !text.contains(USER_KEY) => Err(AppError::MissingField(USER_KEY)),
        other => Err(AppError::BadRequestBody(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Form body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub user_input: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
