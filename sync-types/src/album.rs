//! Albums: keyed collections of photos plus album metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AlbumId, Photo, PhotoId, PhotoMetadata};

/// Album metadata.
///
/// Every recognized field is present from the start; backends ignore any
/// other keys they find in their persisted documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First day covered by the album.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Last day covered by the album.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Display rank; higher ranks are listed first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Designated cover photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<PhotoId>,
}

impl AlbumMetadata {
    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the date range.
    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Set the display rank.
    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Set the cover photo.
    pub fn with_cover_photo(mut self, photo: PhotoId) -> Self {
        self.cover_photo = Some(photo);
        self
    }

    /// Compare every field except the cover photo.
    ///
    /// The cover is display-only state: backends derive it when none is
    /// stored, so it is not part of what a sync has to converge.
    pub fn content_equal(&self, other: &AlbumMetadata) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.date_from == other.date_from
            && self.date_to == other.date_to
            && self.rank == other.rank
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == AlbumMetadata::default()
    }
}

/// An album: a keyed collection of photos plus metadata.
///
/// Photos are exclusively owned and kept in id order. Identity is the album
/// id alone; there is no `PartialEq`.
#[derive(Debug, Clone, Serialize)]
pub struct Album {
    id: AlbumId,
    #[serde(skip_serializing_if = "AlbumMetadata::is_empty")]
    metadata: AlbumMetadata,
    photos: BTreeMap<PhotoId, Photo>,
}

impl Album {
    /// Create an empty album.
    pub fn new(id: AlbumId) -> Self {
        Self {
            id,
            metadata: AlbumMetadata::default(),
            photos: BTreeMap::new(),
        }
    }

    /// Builder-style metadata setter.
    pub fn with_metadata(mut self, metadata: AlbumMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The album id.
    pub fn id(&self) -> &AlbumId {
        &self.id
    }

    /// The album metadata.
    pub fn metadata(&self) -> &AlbumMetadata {
        &self.metadata
    }

    /// Replace the album metadata.
    pub fn set_metadata(&mut self, metadata: AlbumMetadata) {
        self.metadata = metadata;
    }

    /// Display name, falling back to the id.
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Add a photo by id, replacing any photo with the same id.
    pub fn add_photo(&mut self, id: impl Into<PhotoId>, metadata: PhotoMetadata) -> &Photo {
        let id = id.into();
        let photo = Photo::new(self.id.clone(), id.clone(), metadata);
        self.put(id, photo)
    }

    /// Insert an existing photo, replacing any photo with the same id.
    ///
    /// A photo from another album is re-homed into this one with its id and
    /// metadata intact.
    pub fn insert_photo(&mut self, photo: Photo) -> &Photo {
        let photo = if photo.album_id() == &self.id {
            photo
        } else {
            photo.rehome(self.id.clone())
        };
        self.put(photo.id().clone(), photo)
    }

    fn put(&mut self, id: PhotoId, photo: Photo) -> &Photo {
        use std::collections::btree_map::Entry;
        match self.photos.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(photo);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(photo),
        }
    }

    /// Remove a photo by id.
    pub fn remove_photo(&mut self, id: &PhotoId) -> Option<Photo> {
        self.photos.remove(id)
    }

    /// Look up a photo by id.
    pub fn photo(&self, id: &PhotoId) -> Option<&Photo> {
        self.photos.get(id)
    }

    /// True if a photo with this id exists.
    pub fn contains(&self, id: &PhotoId) -> bool {
        self.photos.contains_key(id)
    }

    /// Photos in ascending id order.
    pub fn photos(&self) -> impl Iterator<Item = &Photo> {
        self.photos.values()
    }

    /// Photo ids in ascending order.
    pub fn photo_ids(&self) -> impl Iterator<Item = &PhotoId> {
        self.photos.keys()
    }

    /// The keyed photo collection.
    pub fn photo_map(&self) -> &BTreeMap<PhotoId, Photo> {
        &self.photos
    }

    /// Number of photos.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// True if the album has no photos.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Deep, independent copy of this album.
    pub fn snapshot(&self) -> Album {
        self.clone()
    }

    /// The designated cover photo, or the first photo when none is set
    /// (or the designated one is gone).
    pub fn cover_photo(&self) -> Option<&Photo> {
        self.metadata
            .cover_photo
            .as_ref()
            .and_then(|id| self.photos.get(id))
            .or_else(|| self.photos.values().next())
    }
}
