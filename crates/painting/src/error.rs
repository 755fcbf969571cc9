use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned when creating or rebinding a paint session
#[derive(Debug, Error)]
pub enum PaintError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No canvas is bound to the session")]
    NoCanvas,
}

pub type PaintResult<T> = Result<T, PaintError>;
