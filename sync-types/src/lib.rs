//! # sync-types
//!
//! Entity model for gallery-sync.
//!
//! This crate provides the foundational types used across all gallery-sync crates:
//! - [`GalleryId`], [`AlbumId`], [`PhotoId`], [`PhotoKey`] - Identity types
//! - [`Photo`], [`Album`], [`Gallery`] - The two-level hierarchy being synchronized
//! - [`PhotoMetadata`], [`AlbumMetadata`] - Content records compared during diff
//! - [`GalleryError`] - Data-integrity errors
//!
//! ## Identity vs. content
//!
//! Only the id types implement `Eq`/`Ord`/`Hash`. Entities are matched across
//! independently built snapshots by id, and compared for content through
//! [`Photo::metadata_equal`] and [`AlbumMetadata::content_equal`]. The entity
//! types have no `PartialEq`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod album;
mod error;
mod gallery;
mod ids;
mod photo;

pub use album::{Album, AlbumMetadata};
pub use error::GalleryError;
pub use gallery::Gallery;
pub use ids::{AlbumId, GalleryId, PhotoId, PhotoKey};
pub use photo::{Photo, PhotoMetadata};

/// Calendar date used for `date_taken`, `date_from` and `date_to`.
pub use chrono::NaiveDate;
