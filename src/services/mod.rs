pub mod catalog;
pub mod chat_session;
pub mod gemini;
pub mod instruction;
