//! # sync-content
//!
//! Local filesystem endpoint for gallery-sync.
//!
//! A gallery on disk is a directory of album directories. Photos are the
//! image files inside each album; album and photo metadata live in YAML
//! documents next to them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sync_client::{SyncConfig, Synchronizer};
//! use sync_content::FsEndpoint;
//!
//! let source = Arc::new(FsEndpoint::new("/photos/originals"));
//! let target = Arc::new(FsEndpoint::new("/mnt/backup/photos"));
//! let report = Synchronizer::new(source, target, SyncConfig::default())
//!     .sync()
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod fs;
pub mod metadata;

pub use fs::{is_image_name, FsEndpoint, IMAGE_EXTENSIONS};
