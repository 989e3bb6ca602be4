//! Snapshot comparison.
//!
//! [`diff_album`] compares photos by id and classifies common photos as
//! changed when their metadata differs. [`diff_gallery`] applies the same id
//! algebra to albums and recurses into albums present on both sides.
//!
//! Both functions are pure, and list children in ascending id order.

use std::collections::BTreeMap;
use sync_types::{Album, Gallery};

use crate::ids::partition;
use crate::patch::{AlbumPatch, GalleryPatch};

/// Compute the patch that turns album `a` into album `b`.
///
/// The patch is addressed to `a`'s id; photos in `added` and `changed`
/// carry `b`'s content.
pub fn diff_album(a: &Album, b: &Album) -> AlbumPatch {
    let photos_a = a.photo_map();
    let photos_b = b.photo_map();
    let ids = partition(photos_a, photos_b);

    let added = ids.only_b.iter().map(|id| photos_b[*id].clone()).collect();
    let removed = ids.only_a.iter().map(|id| photos_a[*id].clone()).collect();
    let changed = ids
        .both
        .iter()
        .filter(|id| !photos_a[**id].metadata_equal(&photos_b[**id]))
        .map(|id| photos_b[*id].clone())
        .collect();

    let metadata = if a.metadata().content_equal(b.metadata()) {
        None
    } else {
        Some(b.metadata().clone())
    };

    AlbumPatch {
        album_id: a.id().clone(),
        added,
        removed,
        changed,
        metadata,
    }
}

/// Compute the patch that turns gallery `a` into gallery `b`.
///
/// Albums present on both sides are diffed with [`diff_album`]; only
/// non-empty results are kept in `changed`.
pub fn diff_gallery(a: &Gallery, b: &Gallery) -> GalleryPatch {
    let albums_a = a.album_map();
    let albums_b = b.album_map();
    let ids = partition(albums_a, albums_b);

    let added = ids.only_b.iter().map(|id| albums_b[*id].clone()).collect();
    let removed = ids.only_a.iter().map(|id| albums_a[*id].clone()).collect();

    let mut changed = BTreeMap::new();
    for id in ids.both {
        let patch = diff_album(&albums_a[id], &albums_b[id]);
        if !patch.is_empty() {
            changed.insert(id.clone(), patch);
        }
    }

    GalleryPatch {
        added,
        removed,
        changed,
    }
}
