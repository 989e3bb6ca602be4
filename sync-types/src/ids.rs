//! Identity types for gallery-sync.
//!
//! Ids are filename-like tokens. The model itself accepts any string; backends
//! that map ids onto paths check [`AlbumId::is_path_safe`] (and friends) first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::GalleryError;

/// Returns true if `s` can be used as exactly one path component.
fn path_safe(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && !s.contains(['/', '\\', '\0'])
}

macro_rules! token_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from any string-like token.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Check whether this id can be used as a single path component.
            pub fn is_path_safe(&self) -> bool {
                path_safe(&self.0)
            }

            /// Return the id if it is path safe, an `InvalidId` error otherwise.
            pub fn require_path_safe(&self) -> Result<&str, GalleryError> {
                if self.is_path_safe() {
                    Ok(&self.0)
                } else {
                    Err(GalleryError::InvalidId {
                        kind: $kind,
                        id: self.0.clone(),
                    })
                }
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

token_id!(
    /// Identifier of a gallery (the root of one backend's hierarchy).
    GalleryId,
    "gallery"
);

token_id!(
    /// Identifier of an album, unique within its gallery.
    AlbumId,
    "album"
);

token_id!(
    /// Identifier of a photo, unique within its album.
    ///
    /// There is no cross-album photo identity; see [`PhotoKey`].
    PhotoId,
    "photo"
);

/// Full identity of a photo: the owning album plus the photo id.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhotoKey {
    /// Owning album.
    pub album_id: AlbumId,
    /// Photo id within the album.
    pub photo_id: PhotoId,
}

impl PhotoKey {
    /// Create a photo key.
    pub fn new(album_id: AlbumId, photo_id: PhotoId) -> Self {
        Self { album_id, photo_id }
    }
}

impl fmt::Display for PhotoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.album_id, self.photo_id)
    }
}

impl fmt::Debug for PhotoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhotoKey({}/{})", self.album_id, self.photo_id)
    }
}
