//! Core domain model for autovec.
//!
//! This crate defines the article documents, the auto-embedding search
//! index definition, the semantic query, and the shapes returned by the
//! database (ranked hits and search index status). It renders each of
//! them into the BSON commands and pipelines the database expects.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;

pub use error::{Error, Result};
