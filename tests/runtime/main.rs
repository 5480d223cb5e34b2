//! Integration tests for Layer 3: Runtime
//!
//! Tests for sending paged replies and answering prompts over a transport.

mod paging;
mod prompts;
