//! Core types and trait definitions for the Touchline match store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod error;
pub mod matches;
pub mod retention;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod transform;

pub use error::{Error, Result};
