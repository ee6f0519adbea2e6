//! Shared types used across the crate
//!
//! - `error`: typed outcomes callers branch on
//! - `settings`: runtime configuration handed to a session

pub mod error;
pub mod settings;

use crate::artifacts::core::error::DecodeError;
use bytes::Bytes;

pub trait Packable {
    fn serialize(&self) -> std::io::Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(bytes: Bytes) -> Result<Self, DecodeError>
    where
        Self: Sized;
}
