//! Photos: the leaf entities of a gallery.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AlbumId, PhotoId, PhotoKey};

/// Descriptive metadata of a photo.
///
/// This record is the sole basis for classifying a photo as changed during
/// a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Day the photo was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_taken: Option<NaiveDate>,
}

impl PhotoMetadata {
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

    /// Set the date taken.
    pub fn with_date_taken(mut self, date: NaiveDate) -> Self {
        self.date_taken = Some(date);
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.date_taken.is_none()
    }
}

/// A photo inside an album.
///
/// A photo cannot exist without an owning album: the only constructor takes
/// the album id. Values are immutable; a metadata change produces a new
/// `Photo` through [`Photo::with_metadata`].
///
/// There is no `PartialEq`: use [`Photo::key`] for identity and
/// [`Photo::metadata_equal`] for content.
#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    album_id: AlbumId,
    id: PhotoId,
    #[serde(skip_serializing_if = "PhotoMetadata::is_empty")]
    metadata: PhotoMetadata,
}

impl Photo {
    /// Create a photo owned by `album_id`.
    pub fn new(album_id: AlbumId, id: PhotoId, metadata: PhotoMetadata) -> Self {
        Self {
            album_id,
            id,
            metadata,
        }
    }

    /// The photo id within its album.
    pub fn id(&self) -> &PhotoId {
        &self.id
    }

    /// The owning album.
    pub fn album_id(&self) -> &AlbumId {
        &self.album_id
    }

    /// Full identity (album id + photo id).
    pub fn key(&self) -> PhotoKey {
        PhotoKey::new(self.album_id.clone(), self.id.clone())
    }

    /// The photo's metadata.
    pub fn metadata(&self) -> &PhotoMetadata {
        &self.metadata
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    /// Day taken, if known.
    pub fn date_taken(&self) -> Option<NaiveDate> {
        self.metadata.date_taken
    }

    /// Compare name, description and date taken. Identity is not considered.
    pub fn metadata_equal(&self, other: &Photo) -> bool {
        self.metadata == other.metadata
    }

    /// A copy of this photo carrying different metadata.
    pub fn with_metadata(&self, metadata: PhotoMetadata) -> Photo {
        Photo {
            album_id: self.album_id.clone(),
            id: self.id.clone(),
            metadata,
        }
    }

    /// Move this photo into another album, keeping id and metadata.
    pub(crate) fn rehome(self, album_id: AlbumId) -> Photo {
        Photo { album_id, ..self }
    }
}
