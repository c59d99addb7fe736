//! Common test utilities and helpers
//!
//! Shared fixtures, the sandbox and assertion helpers used across the
//! integration tests.
#![allow(dead_code)]

pub mod assertion_helpers;
pub mod test_fixtures;
pub mod test_helpers;
