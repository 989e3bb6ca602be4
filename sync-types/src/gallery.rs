//! Galleries: the root of one backend's album hierarchy.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::{Album, AlbumId, GalleryId};

/// A gallery: a keyed collection of albums.
#[derive(Debug, Clone, Serialize)]
pub struct Gallery {
    id: GalleryId,
    albums: BTreeMap<AlbumId, Album>,
}

impl Gallery {
    /// Create an empty gallery.
    pub fn new(id: GalleryId) -> Self {
        Self {
            id,
            albums: BTreeMap::new(),
        }
    }

    /// The gallery id.
    pub fn id(&self) -> &GalleryId {
        &self.id
    }

    /// Add an album, replacing any album with the same id.
    pub fn add_album(&mut self, album: Album) -> &mut Album {
        use std::collections::btree_map::Entry;
        match self.albums.entry(album.id().clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(album);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(album),
        }
    }

    /// Remove an album by id.
    pub fn remove_album(&mut self, id: &AlbumId) -> Option<Album> {
        self.albums.remove(id)
    }

    /// Look up an album by id.
    pub fn album(&self, id: &AlbumId) -> Option<&Album> {
        self.albums.get(id)
    }

    /// Look up an album by id for modification.
    pub fn album_mut(&mut self, id: &AlbumId) -> Option<&mut Album> {
        self.albums.get_mut(id)
    }

    /// True if an album with this id exists.
    pub fn contains(&self, id: &AlbumId) -> bool {
        self.albums.contains_key(id)
    }

    /// Albums in ascending id order.
    pub fn albums(&self) -> impl Iterator<Item = &Album> {
        self.albums.values()
    }

    /// The keyed album collection.
    pub fn album_map(&self) -> &BTreeMap<AlbumId, Album> {
        &self.albums
    }

    /// Number of albums.
    pub fn len(&self) -> usize {
        self.albums.len()
    }

    /// True if the gallery has no albums.
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Total number of photos across all albums.
    pub fn photo_count(&self) -> usize {
        self.albums.values().map(Album::len).sum()
    }

    /// Albums in display order: highest rank first, then most recent
    /// `date_from` first. A missing rank counts as 0; albums without a
    /// start date come after dated albums of the same rank. Ties fall back
    /// to id order.
    pub fn albums_by_rank(&self) -> Vec<&Album> {
        let mut albums: Vec<&Album> = self.albums.values().collect();
        albums.sort_by(|a, b| display_order(a, b));
        albums
    }

    /// Deep, independent copy of this gallery.
    pub fn snapshot(&self) -> Gallery {
        self.clone()
    }
}

fn display_order(a: &Album, b: &Album) -> Ordering {
    let rank_a = a.metadata().rank.unwrap_or(0);
    let rank_b = b.metadata().rank.unwrap_or(0);
    rank_b
        .cmp(&rank_a)
        // Option orders None first; reversed, dated albums lead.
        .then_with(|| b.metadata().date_from.cmp(&a.metadata().date_from))
        .then_with(|| a.id().cmp(b.id()))
}
