//! Error results that can be returned from the css crate

use thiserror::Error;

/// Errors that can be returned by the tokenizer, parser and property compiler.
///
/// Note that running out of input is not an error: it is signalled through the `NeedData`
/// variants of the respective result types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    /// Grammar or value domain violation. The offending declaration, selector or at-rule is
    /// discarded as a whole.
    #[error("invalid css")]
    Invalid,

    /// An allocation could not be satisfied. Partial output of the failing call must be discarded.
    #[error("out of memory")]
    OutOfMemory,

    /// Programmer error: the api was used in a way that is not allowed
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// The requested character set is not supported
    #[error("unsupported charset: {0}")]
    Charset(String),
}

impl From<std::collections::TryReserveError> for CssError {
    fn from(_: std::collections::TryReserveError) -> Self {
        CssError::OutOfMemory
    }
}

/// Result that can be returned which holds either T or a [`CssError`]
pub type CssResult<T> = Result<T, CssError>;
