//! # sync-client
//!
//! Endpoint contract and synchronizer for gallery-sync.
//!
//! This is the crate applications use to keep one gallery backend in step
//! with another.
//!
//! ## Features
//!
//! - **Endpoint Abstraction**: pluggable backends behind one async trait
//! - **Two-Tier Dispatch**: whole-album operations for albums on one side,
//!   per-photo operations for albums on both
//! - **Bounded Concurrency**: operations fan out over a fixed worker count
//! - **Pure Planning**: uses sync-core for side-effect-free diffing
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sync_client::{MemoryEndpoint, SyncConfig, Synchronizer};
//!
//! let source = Arc::new(MemoryEndpoint::new("source"));
//! let target = Arc::new(MemoryEndpoint::new("target"));
//! let sync = Synchronizer::new(source, target, SyncConfig::default());
//!
//! let report = sync.sync().await?;
//! println!("{} operations applied", report.applied);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod endpoint;
pub mod memory;
pub mod sync;

pub use endpoint::{Endpoint, EndpointError, PhotoSource};
pub use memory::MemoryEndpoint;
pub use sync::{
    DispatchFailure, ErrorPolicy, SyncConfig, SyncError, SyncPlan, SyncReport, Synchronizer,
    DEFAULT_CONCURRENCY,
};
