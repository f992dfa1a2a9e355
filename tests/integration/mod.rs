//! Integration tests for the story synchronization engine
//!
//! These tests verify end-to-end behavior across the parser, converters,
//! field mapper and sync engines, driving the remote traits with in-memory
//! fakes.

pub mod fakes;
pub mod pull_flow;
pub mod push_flow;
pub mod round_trip;
