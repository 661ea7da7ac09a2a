//! Deterministic JSON serialization for files written by the client.
//!
//! Output is stable across runs:
//! - Object keys sorted (via `BTreeMap` in the serialized types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
