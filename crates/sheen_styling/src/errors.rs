//! Error results that can be returned from the styling crate

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    /// A list could not be allocated. The computed style must be discarded as a whole.
    #[error("out of memory")]
    OutOfMemory,

    /// An instruction was truncated or carried an unknown value
    #[error("invalid bytecode")]
    InvalidBytecode,
}

impl From<std::collections::TryReserveError> for CascadeError {
    fn from(_: std::collections::TryReserveError) -> Self {
        CascadeError::OutOfMemory
    }
}

pub type CascadeResult<T> = Result<T, CascadeError>;
