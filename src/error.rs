//! Error types for the wizard controller and its stores

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a key-value store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the wizard controller
#[derive(Error, Debug)]
pub enum WizardError {
    #[error("invalid wizard configuration: {0}")]
    Config(String),

    #[error("step '{0}' is defined more than once")]
    DuplicateStep(String),

    #[error("no page exists at step index {0}")]
    NoActivePage(isize),

    #[error("failed to persist form values: {0}")]
    Store(#[from] StoreError),

    #[error("failed to serialize form values: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("completion handler failed: {0}")]
    Completion(#[source] Box<dyn std::error::Error + Send + Sync>),
}
