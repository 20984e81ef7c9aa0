#![allow(dead_code)]

use thiserror::Error;

/// Worker-level error type.
///
/// The orchestrator is the only place these cross an entry boundary; every
/// variant below either downgrades to a logged skip or leaves the entry
/// unmarked for the next run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
