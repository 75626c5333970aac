//! UTF-16 runtime for the automation boundary
//!
//! Foreign objects take and return text as UTF-16 code units, while the host
//! works with UTF-8 `String`s. This crate provides the transcoding helpers and
//! the process-wide scratch buffer used to do the conversion without an
//! allocation on every call.
//!
//! # Scratch buffer lifecycle
//!
//! ```text
//! try_acquire ──► held (shared buffer) ──► grow / spill ──► drop (released)
//!      │
//!      └── already held ──► private buffer owned by the caller
//! ```
//!
//! Acquisition never waits: a caller that finds the shared buffer in use gets
//! a private allocation instead, so reentrant or concurrent conversions stay
//! correct and bounded.

mod error;
mod pool;
mod transcode;

pub use error::{Result, WstrError};
pub use pool::{PoolStats, ScratchBuffer, ScratchBufferPool, DEFAULT_SCRATCH_LIMIT};
pub use transcode::{decode, encoded_len, try_decode, until_nul};
