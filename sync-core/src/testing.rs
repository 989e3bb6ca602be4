//! Fixtures shared by the unit tests of this crate.

use proptest::prelude::*;
use proptest::{collection, option};
use sync_types::{Album, AlbumId, AlbumMetadata, Gallery, GalleryId, PhotoId, PhotoMetadata};

/// Album with the given photos; a `Some(name)` sets the photo name.
pub fn album(id: &str, photos: &[(&str, Option<&str>)]) -> Album {
    let mut album = Album::new(AlbumId::new(id));
    for (photo, name) in photos {
        let mut metadata = PhotoMetadata::default();
        metadata.name = name.map(str::to_string);
        album.add_photo(*photo, metadata);
    }
    album
}

/// Album with unnamed photos.
pub fn plain(id: &str, photos: &[&str]) -> Album {
    let photos: Vec<(&str, Option<&str>)> = photos.iter().map(|p| (*p, None)).collect();
    album(id, &photos)
}

/// Gallery holding the given albums.
pub fn gallery(id: &str, albums: Vec<Album>) -> Gallery {
    let mut gallery = Gallery::new(GalleryId::new(id));
    for album in albums {
        gallery.add_album(album);
    }
    gallery
}

/// Sorted ids of a slice of photos.
pub fn photo_ids(photos: &[sync_types::Photo]) -> Vec<String> {
    photos.iter().map(|p| p.id().to_string()).collect()
}

/// Album drawing photo ids from a pool of 12, each with one of three
/// names (or none). The album itself may carry one of two names.
pub fn arb_album(id: &'static str) -> impl Strategy<Value = Album> {
    (
        collection::btree_map(0u8..12, option::of(1u8..4), 0..12),
        option::of(0u8..2),
    )
        .prop_map(move |(photos, album_name)| {
            let mut metadata = AlbumMetadata::default();
            metadata.name = album_name.map(|k| format!("album-{}", k));
            let mut album = Album::new(AlbumId::new(id)).with_metadata(metadata);
            for (n, name) in photos {
                let mut metadata = PhotoMetadata::default();
                metadata.name = name.map(|k| format!("name-{}", k));
                album.add_photo(PhotoId::new(format!("p{:02}", n)), metadata);
            }
            album
        })
}

/// Gallery holding some subset of the albums `a` to `d`.
pub fn arb_gallery() -> impl Strategy<Value = Gallery> {
    let slot = |id: &'static str| option::weighted(0.75, arb_album(id));
    (slot("a"), slot("b"), slot("c"), slot("d")).prop_map(|(a, b, c, d)| {
        gallery("g", [a, b, c, d].into_iter().flatten().collect())
    })
}
