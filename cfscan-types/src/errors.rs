use thiserror::Error;

use crate::SlotType;

/// Failure to convert one textual cell value into its slot type.
///
/// Conversion errors carry no row context; the scan node decides what a failed
/// value means for the row it belongs to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The value was empty and the target type has no empty representation.
    #[error("empty value cannot be converted to {target}")]
    Empty { target: SlotType },

    /// The value does not follow the target type's textual grammar.
    #[error("malformed {target} value '{text}'")]
    Malformed { target: SlotType, text: String },

    /// The value is well formed but does not fit the target type.
    #[error("{target} value '{text}' is out of range")]
    Overflow { target: SlotType, text: String },

    /// The value bytes are not valid UTF-8.
    #[error("value is not valid UTF-8 text for {target}")]
    InvalidUtf8 { target: SlotType },
}

impl ConversionError {
    pub fn target(&self) -> SlotType {
        match self {
            ConversionError::Empty { target }
            | ConversionError::Malformed { target, .. }
            | ConversionError::Overflow { target, .. }
            | ConversionError::InvalidUtf8 { target } => *target,
        }
    }
}

impl From<ConversionError> for cfscan_result::Error {
    fn from(err: ConversionError) -> Self {
        cfscan_result::Error::conversion(err)
    }
}
