//! Test doubles for the native client boundary.
//!
//! Enabled for this crate's own tests and, for downstream crates, through the
//! `test-utils` feature.

mod mock;

pub use mock::{MockEvent, MockPool};
