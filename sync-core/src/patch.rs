//! Patches: directional edit sets between two snapshots.
//!
//! A patch computed by `diff(a, b)` describes how to turn `a` into `b`:
//! - `added`: children of `b` missing from `a`, with `b`'s content
//! - `removed`: children of `a` missing from `b`, with `a`'s content
//! - `changed`: children of both whose content differs, with `b`'s content
//!
//! The three id sets are pairwise disjoint.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use sync_types::{Album, AlbumId, AlbumMetadata, Photo};

/// Photo-granularity difference between two albums.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumPatch {
    /// Album the patch applies to.
    pub album_id: AlbumId,
    /// Photos present only in the target state.
    pub added: Vec<Photo>,
    /// Photos present only in the current state.
    pub removed: Vec<Photo>,
    /// Photos present in both with different metadata (target content).
    pub changed: Vec<Photo>,
    /// New album metadata, when the descriptive fields differ.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AlbumMetadata>,
}

impl AlbumPatch {
    /// An empty patch for `album_id`.
    pub fn new(album_id: AlbumId) -> Self {
        Self {
            album_id,
            added: Vec::new(),
            removed: Vec::new(),
            changed: Vec::new(),
            metadata: None,
        }
    }

    /// True if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.metadata.is_none()
    }

    /// Number of photo-level entries.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Album-granularity difference between two galleries.
///
/// Albums that exist on both sides appear in `changed` only when their
/// nested [`AlbumPatch`] is non-empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GalleryPatch {
    /// Albums present only in the target state, with all their photos.
    pub added: Vec<Album>,
    /// Albums present only in the current state.
    pub removed: Vec<Album>,
    /// Nested patches for albums present on both sides.
    pub changed: BTreeMap<AlbumId, AlbumPatch>,
}

impl GalleryPatch {
    /// True if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Count the entries in each category.
    pub fn summary(&self) -> PatchSummary {
        let mut summary = PatchSummary {
            albums_added: self.added.len(),
            albums_removed: self.removed.len(),
            albums_changed: self.changed.len(),
            ..PatchSummary::default()
        };
        for patch in self.changed.values() {
            summary.photos_added += patch.added.len();
            summary.photos_removed += patch.removed.len();
            summary.photos_changed += patch.changed.len();
            if patch.metadata.is_some() {
                summary.metadata_changed += 1;
            }
        }
        summary
    }
}

/// Entry counts of a [`GalleryPatch`].
///
/// Photo counts cover albums in `changed` only; photos of wholly added or
/// removed albums travel with their album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchSummary {
    /// Albums to create.
    pub albums_added: usize,
    /// Albums to delete.
    pub albums_removed: usize,
    /// Albums patched in place.
    pub albums_changed: usize,
    /// Photos to upload into existing albums.
    pub photos_added: usize,
    /// Photos to delete from existing albums.
    pub photos_removed: usize,
    /// Photos whose metadata is replaced.
    pub photos_changed: usize,
    /// Albums whose metadata is replaced.
    pub metadata_changed: usize,
}

impl fmt::Display for PatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "albums +{} -{} ~{}, photos +{} -{} ~{}, album metadata ~{}",
            self.albums_added,
            self.albums_removed,
            self.albums_changed,
            self.photos_added,
            self.photos_removed,
            self.photos_changed,
            self.metadata_changed,
        )
    }
}
