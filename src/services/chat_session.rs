// src/services/chat_session.rs
use std::{fmt::Debug, sync::Arc};

use tokio::sync::Mutex;

use super::gemini::{ChatModel, Content, UpstreamError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

impl From<&Message> for Content {
    fn from(msg: &Message) -> Self {
        Content::new(msg.role.as_str(), msg.content.clone())
    }
}

/// The one conversation shared by every caller of the process.
#[derive(Clone)]
pub struct ChatSession {
    model: Arc<dyn ChatModel>,
    history: Arc<Mutex<Vec<Message>>>,
}

impl Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession").finish_non_exhaustive()
    }
}

impl ChatSession {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Send one prompt and record the exchange.
    ///
    /// The history lock is held across the upstream call, so concurrent
    /// callers are served one at a time and each exchange lands as an
    /// adjacent user/model pair. A failed call records nothing.
    pub async fn send_message(&self, prompt: &str) -> Result<String, UpstreamError> {
        let mut history = self.history.lock().await;

        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::new(MessageRole::User.as_str(), prompt));

        let reply = self.model.generate(&contents).await?;

        history.push(Message {
            role: MessageRole::User,
            content: prompt.to_string(),
        });
        history.push(Message {
            role: MessageRole::Model,
            content: reply.clone(),
        });
        Ok(reply)
    }

    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
