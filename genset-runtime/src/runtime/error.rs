use std::{error, fmt};

use crate::core::OperatingState;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Operation is not allowed in the current operating state.
    InvalidState {
        operation: &'static str,
        state: OperatingState,
    },
    /// Parameter out of range.
    InvalidParameter(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidState { operation, state } => {
                write!(f, "Cannot {} generator in state {}", operation, state)
            }
            Error::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
