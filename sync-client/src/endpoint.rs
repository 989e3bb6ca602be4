//! The backend contract.
//!
//! An [`Endpoint`] wraps one backend (a directory tree, an in-memory map, a
//! remote photo service) and exposes exactly what the synchronizer needs:
//! a fresh snapshot read and one mutation per dispatch operation.
//!
//! # Design
//!
//! Photo values carry identity and metadata only. Content bytes are pulled
//! on demand through [`PhotoSource`], so an operation that uploads content
//! receives the source endpoint alongside the photo:
//!
//! ```ignore
//! let bytes = source.read_photo(&photo).await?;
//! target.add_photo(&photo, source.as_ref()).await?;
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use sync_types::{Album, AlbumId, AlbumMetadata, Gallery, GalleryError, Photo, PhotoKey};
use thiserror::Error;

/// Endpoint errors.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Filesystem or other local I/O failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The album does not exist on this endpoint.
    #[error("album not found: {0}")]
    AlbumNotFound(AlbumId),

    /// The photo does not exist on this endpoint.
    #[error("photo not found: {0}")]
    PhotoNotFound(PhotoKey),

    /// An id cannot be represented on this backend.
    #[error("{0}")]
    InvalidId(GalleryError),

    /// Stored data is malformed (bad dates, unknown rank encoding).
    #[error("data integrity error: {0}")]
    Integrity(#[from] GalleryError),

    /// Failure injected by a test double.
    #[error("injected failure: {0}")]
    Injected(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl EndpointError {
    /// Wrap an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Read access to photo content.
///
/// Every [`Endpoint`] is also a `PhotoSource`; write operations that
/// transfer content take the source as `&dyn PhotoSource`.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Read the full content of a photo.
    async fn read_photo(&self, photo: &Photo) -> Result<Vec<u8>, EndpointError>;
}

/// A gallery backend.
///
/// All mutations are idempotent from the synchronizer's point of view:
/// each one touches a single resource and may run concurrently with any
/// other mutation produced by the same plan.
#[async_trait]
pub trait Endpoint: PhotoSource {
    /// Human-readable endpoint name, used in logs and errors.
    fn name(&self) -> &str;

    /// Read a fresh snapshot of every album, photo, and metadata field.
    async fn current_gallery(&self) -> Result<Gallery, EndpointError>;

    /// Create an album, uploading all its photos and metadata.
    async fn add_album(&self, album: &Album, source: &dyn PhotoSource)
        -> Result<(), EndpointError>;

    /// Delete an album with all its photos and metadata.
    async fn remove_album(&self, album: &Album) -> Result<(), EndpointError>;

    /// Upload one photo (content and metadata) into an existing album.
    async fn add_photo(&self, photo: &Photo, source: &dyn PhotoSource)
        -> Result<(), EndpointError>;

    /// Remove one photo (content and metadata).
    async fn delete_photo(&self, photo: &Photo) -> Result<(), EndpointError>;

    /// Overwrite one photo (content and metadata).
    async fn update_photo(
        &self,
        photo: &Photo,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError>;

    /// Replace the metadata document of an existing album.
    async fn update_album_metadata(
        &self,
        album_id: &AlbumId,
        metadata: &AlbumMetadata,
    ) -> Result<(), EndpointError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = EndpointError::io(
            "/tmp/gallery/a1",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error at /tmp/gallery/a1: denied");
    }

    #[test]
    fn gallery_error_converts_to_integrity() {
        let err: EndpointError = GalleryError::InvalidMetadata {
            owner: "album a1".into(),
            field: "date_from".into(),
            reason: "not a date".into(),
        }
        .into();
        assert!(matches!(err, EndpointError::Integrity(_)));
        assert!(err.to_string().starts_with("data integrity error:"));
    }
}
