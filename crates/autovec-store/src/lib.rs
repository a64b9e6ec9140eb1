//! Operator workflows for auto-embedding vector search.
//!
//! Implements index provisioning and the embedding smoke test on top of
//! the [`SearchStore`] seam, with a MongoDB implementation.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod mongo;
pub mod provision;
pub mod smoke;
pub mod store;
pub mod wait;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use mongo::MongoStore;
pub use provision::{ProvisionReport, Provisioner};
pub use smoke::{SmokeReport, SmokeTest, DEFAULT_QUERY};
pub use store::SearchStore;
pub use wait::{PollSettings, WaitMode, WaitOutcome, WaitStrategy};
