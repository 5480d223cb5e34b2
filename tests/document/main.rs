//! Integration tests for Layer 1: Document
//!
//! Tests for document trees, lockstep fringe walking, and paging.

mod paging;
mod walker;
