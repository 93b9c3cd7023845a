// src/services/instruction.rs
use std::path::Path;

use crate::error::StartupError;

const CATALOG_INTRO: &str = "Por si acaso, el catálogo es el siguiente, por si preguntan:";
const QUESTION_INTRO: &str = "A continuación la pregunta:";

/// The prefix sent ahead of every user message. The wording is part of how
/// the model is steered, so keep it byte-for-byte.
pub fn build_instruction(base: &str, catalog: &str) -> String {
    format!("{base}\n{CATALOG_INTRO}\n{catalog}\n{QUESTION_INTRO}\n")
}

pub async fn compose_instruction(path: &Path, catalog: &str) -> Result<String, StartupError> {
    let base = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StartupError::Instruction {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(build_instruction(&base, catalog))
}
