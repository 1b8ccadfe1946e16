//! # teamchat-shared
//!
//! Identifier newtypes, enums and constants shared by the store and the
//! client crates.

pub mod constants;
pub mod error;
pub mod types;

pub use error::ErrorKind;
pub use types::*;
