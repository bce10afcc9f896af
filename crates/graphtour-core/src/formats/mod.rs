//! # Formats
//!
//! Byte-level serialization formats. File I/O lives in the app layer; the
//! core only turns values into bytes and back.

pub mod persistence;

pub use persistence::{PersistenceHeader, SavedState, state_from_bytes, state_to_bytes};
