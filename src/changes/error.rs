use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangesErrorCode {
    ContractViolation,
    SourceFailure,
}

impl ChangesErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangesErrorCode::ContractViolation => "changes/contract-violation",
            ChangesErrorCode::SourceFailure => "changes/source-failure",
        }
    }
}

/// Error delivered to subscribers. Every error reaching a subscriber is terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangesError {
    pub code: ChangesErrorCode,
    message: String,
}

impl ChangesError {
    pub fn new(code: ChangesErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the error signals that the source and the local
    /// sequence no longer agree on index space.
    pub fn is_contract_violation(&self) -> bool {
        self.code == ChangesErrorCode::ContractViolation
    }
}

impl Display for ChangesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for ChangesError {}

pub type ChangesResult<T> = Result<T, ChangesError>;

pub fn contract_violation(message: impl Into<String>) -> ChangesError {
    ChangesError::new(ChangesErrorCode::ContractViolation, message)
}

pub fn source_failure(message: impl Into<String>) -> ChangesError {
    ChangesError::new(ChangesErrorCode::SourceFailure, message)
}
