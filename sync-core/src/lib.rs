//! # sync-core
//!
//! Pure diff/patch logic for gallery-sync (no I/O, instant tests).
//!
//! This crate compares two gallery snapshots, describes the difference as a
//! patch, replays patches against snapshots, and turns a patch into the
//! ordered list of backend operations a synchronizer dispatches.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take snapshots and produce
//! new values without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output, in id order)
//! - Easy reasoning about round trips: `apply(a, diff(a, b)) ≈ b`
//!
//! The actual I/O (reading snapshots, uploading photos) is performed by
//! `sync-client`, which dispatches the operations produced by [`plan`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod diff;
pub mod patch;
pub mod plan;

mod ids;
#[cfg(test)]
mod testing;

pub use apply::{apply_album_patch, apply_gallery_patch};
pub use diff::{diff_album, diff_gallery};
pub use patch::{AlbumPatch, GalleryPatch, PatchSummary};
pub use plan::{plan, Operation, OperationKind, ResourceKey};
