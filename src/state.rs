// src/state.rs
use std::sync::Arc;

use crate::services::chat_session::ChatSession;

pub type SharedState = Arc<AppState>;

#[derive(Debug)]
pub struct AppState {
    pub session: ChatSession,
    pub instruction: String,
}

impl AppState {
    pub fn new(session: ChatSession, instruction: impl Into<String>) -> Self {
        Self {
            session,
            instruction: instruction.into(),
        }
    }

    /// Instruction prefix followed directly by the user's text.
    pub fn full_prompt(&self, user_text: &str) -> String {
        format!("{}{}", self.instruction, user_text)
    }
}
