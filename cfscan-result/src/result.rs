use crate::error::Error;

/// Result type alias used throughout cfscan.
///
/// All cfscan operations that can fail return this type.
pub type Result<T> = std::result::Result<T, Error>;
