//! Warden - Command grammar and incremental rendering for a moderation bot
//!
//! This crate re-exports all layers of the Warden system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: warden_runtime    - Matrix adaptor, prompts, dispatcher, console
//! Layer 2: warden_interface  - Reader, presentation types, parameters, tables
//! Layer 1: warden_document   - Document trees, fringe walker, paged rendering
//! Layer 0: warden_foundation - Core types (Error, Matrix identifiers)
//! ```

pub use warden_document as document;
pub use warden_foundation as foundation;
pub use warden_interface as interface;
pub use warden_runtime as runtime;
