//! Dispatch planning: turning a gallery patch into backend operations.
//!
//! The plan uses coarse whole-album operations for albums that exist on only
//! one side and fine-grained photo operations for albums that exist on both,
//! so an album that gained one photo costs one upload.
//!
//! Order is fixed:
//! 1. `RemoveAlbum` for each removed album
//! 2. `AddAlbum` for each added album
//! 3. per changed album, in id order: `DeletePhoto`, `AddPhoto`,
//!    `UpdatePhoto`, then `UpdateAlbumMetadata`
//!
//! Every operation in one plan touches a distinct [`ResourceKey`], so the
//! operations may also be executed concurrently.

use serde::Serialize;
use std::fmt;
use sync_types::{Album, AlbumId, AlbumMetadata, Photo, PhotoKey};

use crate::patch::{AlbumPatch, GalleryPatch};

/// One backend mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Delete an album with all its photos and metadata.
    RemoveAlbum(Album),
    /// Create an album and upload all its photos and metadata.
    AddAlbum(Album),
    /// Delete one photo from an existing album.
    DeletePhoto(Photo),
    /// Upload one photo into an existing album.
    AddPhoto(Photo),
    /// Overwrite one photo (content and metadata) in an existing album.
    UpdatePhoto(Photo),
    /// Replace the metadata document of an existing album.
    UpdateAlbumMetadata {
        /// Album to update.
        album_id: AlbumId,
        /// New metadata.
        metadata: AlbumMetadata,
    },
}

/// Discriminant of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// [`Operation::RemoveAlbum`]
    RemoveAlbum,
    /// [`Operation::AddAlbum`]
    AddAlbum,
    /// [`Operation::DeletePhoto`]
    DeletePhoto,
    /// [`Operation::AddPhoto`]
    AddPhoto,
    /// [`Operation::UpdatePhoto`]
    UpdatePhoto,
    /// [`Operation::UpdateAlbumMetadata`]
    UpdateAlbumMetadata,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RemoveAlbum => "remove album",
            Self::AddAlbum => "add album",
            Self::DeletePhoto => "delete photo",
            Self::AddPhoto => "add photo",
            Self::UpdatePhoto => "update photo",
            Self::UpdateAlbumMetadata => "update album metadata",
        };
        f.write_str(s)
    }
}

/// The backend resource an operation touches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ResourceKey {
    /// A whole album (directory, prefix, ...).
    Album(AlbumId),
    /// One photo.
    Photo(PhotoKey),
    /// The metadata document of an album.
    AlbumMetadata(AlbumId),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Album(id) => write!(f, "{}", id),
            Self::Photo(key) => write!(f, "{}", key),
            Self::AlbumMetadata(id) => write!(f, "{}/<metadata>", id),
        }
    }
}

impl Operation {
    /// The operation's discriminant.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::RemoveAlbum(_) => OperationKind::RemoveAlbum,
            Self::AddAlbum(_) => OperationKind::AddAlbum,
            Self::DeletePhoto(_) => OperationKind::DeletePhoto,
            Self::AddPhoto(_) => OperationKind::AddPhoto,
            Self::UpdatePhoto(_) => OperationKind::UpdatePhoto,
            Self::UpdateAlbumMetadata { .. } => OperationKind::UpdateAlbumMetadata,
        }
    }

    /// The resource this operation touches.
    pub fn resource(&self) -> ResourceKey {
        match self {
            Self::RemoveAlbum(album) | Self::AddAlbum(album) => {
                ResourceKey::Album(album.id().clone())
            }
            Self::DeletePhoto(photo) | Self::AddPhoto(photo) | Self::UpdatePhoto(photo) => {
                ResourceKey::Photo(photo.key())
            }
            Self::UpdateAlbumMetadata { album_id, .. } => {
                ResourceKey::AlbumMetadata(album_id.clone())
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.resource())
    }
}

/// Expand a gallery patch into the ordered operation list.
pub fn plan(patch: &GalleryPatch) -> Vec<Operation> {
    let mut ops = Vec::new();

    ops.extend(patch.removed.iter().cloned().map(Operation::RemoveAlbum));
    ops.extend(patch.added.iter().cloned().map(Operation::AddAlbum));

    for album_patch in patch.changed.values() {
        plan_album(album_patch, &mut ops);
    }

    ops
}

fn plan_album(patch: &AlbumPatch, ops: &mut Vec<Operation>) {
    ops.extend(patch.removed.iter().cloned().map(Operation::DeletePhoto));
    ops.extend(patch.added.iter().cloned().map(Operation::AddPhoto));
    ops.extend(patch.changed.iter().cloned().map(Operation::UpdatePhoto));
    if let Some(metadata) = &patch.metadata {
        ops.push(Operation::UpdateAlbumMetadata {
            album_id: patch.album_id.clone(),
            metadata: metadata.clone(),
        });
    }
}
