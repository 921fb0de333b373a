use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Diary entry not found: {0}")]
    NotFound(String),

    #[error("No character has been created yet")]
    NoCharacter,
}

pub type Result<T> = std::result::Result<T, CompanionError>;
