use thiserror::Error;

use crate::types::IntKind;

/// Error type produced by CIM object construction, conversion and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CimError {
    /// A required field is missing or fields contradict each other.
    #[error("invalid value: {0}")]
    Value(String),
    /// A value of the wrong kind was supplied for a CIM type or slot.
    #[error("type mismatch: {0}")]
    Type(String),
    /// Integer outside the range of its sized CIM type.
    #[error("value {value} is outside the range of {kind} [{min}, {max}]")]
    Range {
        kind: IntKind,
        value: i128,
        min: i128,
        max: i128,
    },
    /// Malformed WBEM URI, CIM datetime string or ValueMap entry.
    #[error("parse error: {0}")]
    Parse(String),
    /// A lookup did not resolve to a defined entry.
    #[error("lookup error: {0}")]
    Lookup(String),
}

impl CimError {
    pub(crate) fn value<S: Into<String>>(msg: S) -> Self {
        CimError::Value(msg.into())
    }

    pub(crate) fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        CimError::Type(msg.into())
    }

    pub(crate) fn parse<S: Into<String>>(msg: S) -> Self {
        CimError::Parse(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = CimError> = std::result::Result<T, E>;
