//! Test suite for the page block model
//!
//! Tests are grouped by concern: editor scenarios, invariant properties, and
//! end-to-end sessions with persistence and the assistant.
