//! The module contains the errors the store can throw.

use sea_orm::DbErr;
use thiserror::Error;

/// Store custom errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown record kind: {0}")]
    UnknownKind(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}
