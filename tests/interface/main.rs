//! Integration tests for Layer 2: Interface
//!
//! Tests for reading commands, binding arguments, and finding commands.

mod parameters;
mod reader;
mod tables;
