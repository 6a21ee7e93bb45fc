//! Shared test utilities for autoalbum integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs with temporary pictures/archive directories
//! - Fake OCR, labeling and completion collaborators
//! - JPEG fixture builders

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::TestHarness;
