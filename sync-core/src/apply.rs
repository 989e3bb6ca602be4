//! Patch replay against snapshots.
//!
//! Both functions are copy-on-write: they return a new value and never
//! mutate their input. Removals run before insertions; since the id sets of
//! a diff-produced patch are disjoint, the order only matters for patches
//! built by hand, where the last write for an id wins.

use sync_types::{Album, Gallery};

use crate::patch::{AlbumPatch, GalleryPatch};

/// Apply `patch` to a copy of `album`.
pub fn apply_album_patch(album: &Album, patch: &AlbumPatch) -> Album {
    let mut next = album.snapshot();
    patch_in_place(&mut next, patch);
    next
}

/// Apply `patch` to a copy of `gallery`.
///
/// Removed albums are dropped whole, added albums are inserted with all
/// their photos, and changed albums get their nested patch. A nested patch
/// for an album the gallery lacks is applied to a new empty album.
pub fn apply_gallery_patch(gallery: &Gallery, patch: &GalleryPatch) -> Gallery {
    let mut next = gallery.snapshot();

    for album in &patch.removed {
        next.remove_album(album.id());
    }

    for album in &patch.added {
        next.add_album(album.snapshot());
    }

    for (id, album_patch) in &patch.changed {
        if !next.contains(id) {
            next.add_album(Album::new(id.clone()));
        }
        if let Some(album) = next.album_mut(id) {
            patch_in_place(album, album_patch);
        }
    }

    next
}

fn patch_in_place(album: &mut Album, patch: &AlbumPatch) {
    for photo in &patch.removed {
        album.remove_photo(photo.id());
    }
    for photo in patch.added.iter().chain(&patch.changed) {
        album.insert_photo(photo.clone());
    }
    if let Some(metadata) = &patch.metadata {
        album.set_metadata(metadata.clone());
    }
}
