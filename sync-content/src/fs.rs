//! Local directory tree as a gallery endpoint.
//!
//! ```text
//! <root>/
//!   album1/
//!     album.yml      album metadata (optional)
//!     photos.yml     photo metadata sidecar (optional)
//!     p1.png         photos: *.jpg, *.jpeg, *.png (any case)
//!     raw/           ignored
//!   album2/
//!     ...
//! ```
//!
//! A directory holding neither photos nor `album.yml` is not an album.
//! Hidden entries are ignored, except that stale `.<name>.partial` files
//! left by an abandoned write are removed when an album is read.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sync_client::{Endpoint, EndpointError, PhotoSource};
use sync_types::{
    Album, AlbumId, AlbumMetadata, Gallery, GalleryError, GalleryId, Photo, PhotoId,
    PhotoMetadata,
};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::metadata::{
    parse_album, parse_photos, render_album, render_photos, ALBUM_DOCUMENT, PHOTOS_DOCUMENT,
};

const PARTIAL_SUFFIX: &str = ".partial";

/// File extensions recognized as photos (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// True if `name` has a photo extension.
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Gallery stored as one directory per album.
pub struct FsEndpoint {
    name: String,
    root: PathBuf,
    // Serializes writes of album.yml and read-modify-write of photos.yml;
    // operations in the same album run concurrently otherwise.
    documents: Mutex<()>,
}

impl FsEndpoint {
    /// Endpoint rooted at `root`, named after the path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: root.display().to_string(),
            root,
            documents: Mutex::new(()),
        }
    }

    /// Override the endpoint name used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The gallery root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn album_dir(&self, id: &AlbumId) -> Result<PathBuf, EndpointError> {
        let name = id.require_path_safe().map_err(EndpointError::InvalidId)?;
        Ok(self.root.join(name))
    }

    fn photo_path(&self, photo: &Photo) -> Result<PathBuf, EndpointError> {
        let dir = self.album_dir(photo.album_id())?;
        let name = photo
            .id()
            .require_path_safe()
            .map_err(EndpointError::InvalidId)?;
        if !is_image_name(name) {
            return Err(EndpointError::InvalidId(GalleryError::InvalidId {
                kind: "photo",
                id: name.to_string(),
            }));
        }
        Ok(dir.join(name))
    }

    /// Album directory that must already exist.
    async fn existing_album_dir(&self, id: &AlbumId) -> Result<PathBuf, EndpointError> {
        let dir = self.album_dir(id)?;
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(EndpointError::AlbumNotFound(id.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(EndpointError::AlbumNotFound(id.clone()))
            }
            Err(e) => Err(EndpointError::io(dir, e)),
        }
    }

    async fn load_album(&self, id: AlbumId, dir: &Path) -> Result<Option<Album>, EndpointError> {
        let photo_ids = scan_photos(dir, true).await?;
        let document = read_optional(&dir.join(ALBUM_DOCUMENT)).await?;

        if photo_ids.is_empty() && document.is_none() {
            debug!(album = %id, "skipping directory without photos");
            return Ok(None);
        }

        let metadata = match document {
            Some(text) => parse_album(&id, &text)?,
            None => AlbumMetadata::default(),
        };
        let mut photo_metadata = match read_optional(&dir.join(PHOTOS_DOCUMENT)).await? {
            Some(text) => parse_photos(&id, &text)?,
            None => BTreeMap::new(),
        };

        let mut album = Album::new(id).with_metadata(metadata);
        for photo_id in photo_ids {
            let metadata = photo_metadata.remove(&photo_id).unwrap_or_default();
            album.add_photo(photo_id, metadata);
        }
        Ok(Some(album))
    }

    /// Write `album.yml`. Empty metadata renders as an empty mapping, which
    /// still marks the directory as an album.
    async fn write_album_document(
        &self,
        dir: &Path,
        metadata: &AlbumMetadata,
    ) -> Result<(), EndpointError> {
        let path = dir.join(ALBUM_DOCUMENT);
        let text = render_album(metadata).map_err(|e| render_error(&path, e))?;
        write_atomic(&path, text.as_bytes()).await
    }

    async fn write_photo_documents<'a>(
        &self,
        dir: &Path,
        photos: impl IntoIterator<Item = (&'a PhotoId, &'a PhotoMetadata)>,
    ) -> Result<(), EndpointError> {
        let path = dir.join(PHOTOS_DOCUMENT);
        let photos: Vec<_> = photos
            .into_iter()
            .filter(|(_, metadata)| !metadata.is_empty())
            .collect();
        if photos.is_empty() {
            return remove_optional(&path).await;
        }
        let text = render_photos(photos).map_err(|e| render_error(&path, e))?;
        write_atomic(&path, text.as_bytes()).await
    }

    /// Read-modify-write the sidecar of one album. Entries whose photo
    /// file is gone are pruned.
    async fn edit_sidecar<F>(
        &self,
        album_id: &AlbumId,
        dir: &Path,
        edit: F,
    ) -> Result<(), EndpointError>
    where
        F: FnOnce(&mut BTreeMap<PhotoId, PhotoMetadata>) + Send,
    {
        let _lock = self.documents.lock().await;
        let path = dir.join(PHOTOS_DOCUMENT);
        let mut photos = match read_optional(&path).await? {
            Some(text) => parse_photos(album_id, &text)?,
            None => BTreeMap::new(),
        };
        edit(&mut photos);

        let mut kept = BTreeMap::new();
        for (id, metadata) in photos {
            let exists = fs::try_exists(dir.join(id.as_str()))
                .await
                .map_err(|e| EndpointError::io(dir, e))?;
            if exists {
                kept.insert(id, metadata);
            }
        }
        self.write_photo_documents(dir, &kept).await
    }

    async fn put_photo(
        &self,
        photo: &Photo,
        source: &dyn PhotoSource,
        skip_identical: bool,
    ) -> Result<(), EndpointError> {
        let path = self.photo_path(photo)?;
        let dir = self.existing_album_dir(photo.album_id()).await?;
        let bytes = source.read_photo(photo).await?;

        if skip_identical {
            write_if_changed(&path, &bytes).await?;
        } else {
            write_atomic(&path, &bytes).await?;
        }

        let id = photo.id().clone();
        let metadata = photo.metadata().clone();
        self.edit_sidecar(photo.album_id(), &dir, move |photos| {
            photos.insert(id, metadata);
        })
        .await
    }
}

#[async_trait]
impl PhotoSource for FsEndpoint {
    async fn read_photo(&self, photo: &Photo) -> Result<Vec<u8>, EndpointError> {
        let path = self.photo_path(photo)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(EndpointError::PhotoNotFound(photo.key()))
            }
            Err(e) => Err(EndpointError::io(path, e)),
        }
    }
}

#[async_trait]
impl Endpoint for FsEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current_gallery(&self) -> Result<Gallery, EndpointError> {
        let mut gallery = Gallery::new(GalleryId::new(self.name.as_str()));
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| EndpointError::io(&self.root, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EndpointError::io(&self.root, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| EndpointError::io(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            let name = match entry.file_name().to_str() {
                Some(name) if !name.starts_with('.') => name.to_string(),
                Some(_) => continue,
                None => {
                    warn!(path = ?entry.path(), "skipping album with non-UTF-8 name");
                    continue;
                }
            };
            if let Some(album) = self.load_album(AlbumId::new(name), &entry.path()).await? {
                gallery.add_album(album);
            }
        }

        debug!(
            endpoint = %self.name,
            albums = gallery.len(),
            photos = gallery.photo_count(),
            "read gallery"
        );
        Ok(gallery)
    }

    async fn add_album(
        &self,
        album: &Album,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError> {
        let dir = self.album_dir(album.id())?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| EndpointError::io(&dir, e))?;

        for photo in album.photos() {
            let path = self.photo_path(photo)?;
            let bytes = source.read_photo(photo).await?;
            write_atomic(&path, &bytes).await?;
        }

        if album.is_empty() || !album.metadata().is_empty() {
            self.write_album_document(&dir, album.metadata()).await?;
        }
        let photos = album.photos().map(|photo| (photo.id(), photo.metadata()));
        self.write_photo_documents(&dir, photos).await?;
        debug!(album = %album.id(), photos = album.len(), "created album");
        Ok(())
    }

    /// Deletes the photos and both documents. The directory itself goes
    /// only if nothing else is left in it.
    async fn remove_album(&self, album: &Album) -> Result<(), EndpointError> {
        let dir = self.existing_album_dir(album.id()).await?;
        for photo_id in scan_photos(&dir, true).await? {
            remove_optional(&dir.join(photo_id.as_str())).await?;
        }
        remove_optional(&dir.join(ALBUM_DOCUMENT)).await?;
        remove_optional(&dir.join(PHOTOS_DOCUMENT)).await?;

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| EndpointError::io(&dir, e))?;
        let leftover = entries
            .next_entry()
            .await
            .map_err(|e| EndpointError::io(&dir, e))?;
        match leftover {
            None => {
                fs::remove_dir(&dir)
                    .await
                    .map_err(|e| EndpointError::io(&dir, e))?;
                debug!(album = %album.id(), "removed album");
            }
            Some(entry) => {
                debug!(
                    album = %album.id(),
                    kept = ?entry.file_name(),
                    "removed album, directory kept for unrelated entries"
                );
            }
        }
        Ok(())
    }

    async fn add_photo(
        &self,
        photo: &Photo,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError> {
        self.put_photo(photo, source, false).await
    }

    async fn delete_photo(&self, photo: &Photo) -> Result<(), EndpointError> {
        let path = self.photo_path(photo)?;
        let dir = self.existing_album_dir(photo.album_id()).await?;
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EndpointError::PhotoNotFound(photo.key()));
            }
            Err(e) => return Err(EndpointError::io(path, e)),
        }

        let id = photo.id().clone();
        self.edit_sidecar(photo.album_id(), &dir, move |photos| {
            photos.remove(&id);
        })
        .await?;

        // The last photo of an album without album.yml would take the
        // album with it.
        let _lock = self.documents.lock().await;
        let document = dir.join(ALBUM_DOCUMENT);
        let marked = fs::try_exists(&document)
            .await
            .map_err(|e| EndpointError::io(&document, e))?;
        if !marked && scan_photos(&dir, false).await?.is_empty() {
            self.write_album_document(&dir, &AlbumMetadata::default())
                .await?;
        }
        Ok(())
    }

    async fn update_photo(
        &self,
        photo: &Photo,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError> {
        self.put_photo(photo, source, true).await
    }

    async fn update_album_metadata(
        &self,
        album_id: &AlbumId,
        metadata: &AlbumMetadata,
    ) -> Result<(), EndpointError> {
        let dir = self.existing_album_dir(album_id).await?;
        let _lock = self.documents.lock().await;
        self.write_album_document(&dir, metadata).await
    }
}

/// Image files directly inside `dir`. With `sweep`, stale `.partial`
/// files are deleted along the way.
async fn scan_photos(dir: &Path, sweep: bool) -> Result<Vec<PhotoId>, EndpointError> {
    let mut photo_ids = Vec::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| EndpointError::io(dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| EndpointError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| EndpointError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if is_partial_name(name) => {
                if sweep {
                    debug!(path = %entry.path().display(), "removing stale partial file");
                    remove_optional(&entry.path()).await?;
                }
            }
            Some(name) if !name.starts_with('.') && is_image_name(name) => {
                photo_ids.push(PhotoId::new(name));
            }
            Some(_) => {}
            None => {
                warn!(path = ?entry.path(), "skipping photo with non-UTF-8 name");
            }
        }
    }
    Ok(photo_ids)
}

fn is_partial_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PARTIAL_SUFFIX)
}

async fn read_optional(path: &Path) -> Result<Option<String>, EndpointError> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EndpointError::io(path, e)),
    }
}

async fn remove_optional(path: &Path) -> Result<(), EndpointError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EndpointError::io(path, e)),
    }
}

/// Write through a hidden temporary file so readers never see a partial
/// photo or document.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), EndpointError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("file");
    let partial = path.with_file_name(format!(".{}{}", file_name, PARTIAL_SUFFIX));
    let written = match fs::write(&partial, bytes).await {
        Ok(()) => fs::rename(&partial, path)
            .await
            .map_err(|e| EndpointError::io(path, e)),
        Err(e) => Err(EndpointError::io(&partial, e)),
    };
    if written.is_err() {
        if let Err(e) = fs::remove_file(&partial).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %partial.display(), error = %e, "failed to clean up partial file");
            }
        }
    }
    written
}

/// Write `bytes` unless the file already holds identical content.
/// Returns whether a write happened.
async fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<bool, EndpointError> {
    match fs::read(path).await {
        Ok(existing) => {
            let digest = blake3::hash(bytes);
            if blake3::hash(&existing) == digest {
                debug!(
                    path = %path.display(),
                    digest = %hex::encode(digest.as_bytes()),
                    "content unchanged"
                );
                return Ok(false);
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(EndpointError::io(path, e)),
    }
    write_atomic(path, bytes).await?;
    Ok(true)
}

fn render_error(path: &Path, error: serde_yaml::Error) -> EndpointError {
    EndpointError::Backend(format!("failed to render {}: {}", path.display(), error))
}
