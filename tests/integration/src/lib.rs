//! Integration test utilities for the starboard
//!
//! This crate provides an in-memory chat platform and fixtures for driving
//! the engine and the dispatcher end to end without a network.

pub mod fake_platform;

pub use fake_platform::*;
pub use fixtures::*;
