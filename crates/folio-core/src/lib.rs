//! Core types and trait definitions for the Folio planning engine.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! Every other crate depends on it.

pub mod dataset;
pub mod error;
pub mod memory;
pub mod model;
pub mod month;
pub mod store;

pub use error::{Error, Result};
