//! Error types and result definitions for the cfscan crates.
//!
//! Every crate in the workspace returns [`Result<T>`] and shares the single
//! [`Error`] enum, so errors travel across crate boundaries with `?` and
//! callers can match on the variant that matters to them.
//!
//! # Error Categories
//!
//! - **Binding errors** ([`Error::SchemaError`]): the plan does not fit the table
//! - **Lifecycle misuse** ([`Error::InvalidStateError`]): calls out of order
//! - **Store availability** ([`Error::ScanUnavailable`]): unreachable store or missing table
//! - **Value conversion** ([`Error::Conversion`]): malformed cell text
//! - **Memory sizing** ([`Error::ResourceExhausted`]): batch memory too small for a tuple
//! - **Plumbing** ([`Error::Io`], [`Error::Arrow`], [`Error::Internal`])

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
