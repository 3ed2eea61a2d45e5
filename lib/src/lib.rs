//! Readers and writers for the chunk formats stored inside RCOL resources.
//!
//! Every chunk model can be parsed with [`RcolChunk::from_bytes`](format::chunk::RcolChunk::from_bytes)
//! and written back with [`RcolChunk::to_bytes`](format::chunk::RcolChunk::to_bytes).
//! Writing a parsed chunk reproduces the input bytes exactly.
pub mod error;
pub mod format;
pub mod util;

pub use error::{Error, Result};
