//! SQLLike Core Types
//!
//! This crate provides the foundational types used throughout SQLLike:
//! - Identity types (NodeId, StreamId)
//! - Value types (the Value enum: integer, float, string, big integer, NA)
//! - Declared column kinds (ValueKind)
//! - NA-aware arithmetic and comparison over values
//! - Common error types

mod arith;
mod error;
mod id;
mod kind;
mod value;

pub use error::*;
pub use id::*;
pub use kind::*;
pub use arith::MAX_REPEAT_LEN;
pub use value::*;
