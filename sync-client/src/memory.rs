//! In-memory endpoint for tests and dry runs.
//!
//! Records every mutation in a journal and allows injecting failures for
//! specific operations.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sync_core::{Operation, OperationKind};
use sync_types::{Album, AlbumId, AlbumMetadata, Gallery, GalleryId, Photo, PhotoKey};

use crate::endpoint::{Endpoint, EndpointError, PhotoSource};

/// In-memory gallery backend.
///
/// Cloning shares state, so a test can keep a handle while the
/// synchronizer owns another.
#[derive(Debug, Clone)]
pub struct MemoryEndpoint {
    name: Arc<str>,
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug)]
struct MemoryState {
    gallery: Gallery,
    content: HashMap<PhotoKey, Vec<u8>>,
    journal: Vec<Operation>,
    failures: HashSet<(OperationKind, String)>,
    latency: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

impl MemoryEndpoint {
    /// Create an empty endpoint.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            inner: Arc::new(Mutex::new(MemoryState {
                gallery: Gallery::new(GalleryId::new(name)),
                content: HashMap::new(),
                journal: Vec::new(),
                failures: HashSet::new(),
                latency: None,
                in_flight: 0,
                max_in_flight: 0,
            })),
        }
    }

    /// Create an endpoint holding the albums of `gallery`.
    ///
    /// Each photo's content is its key rendered as bytes (`"a1/p1"`).
    pub fn with_gallery(name: &str, gallery: &Gallery) -> Self {
        let endpoint = Self::new(name);
        for album in gallery.albums() {
            endpoint.seed_album(album.snapshot());
        }
        endpoint
    }

    /// Store an album directly, bypassing the journal.
    pub fn seed_album(&self, album: Album) {
        let mut state = self.state();
        for photo in album.photos() {
            let key = photo.key();
            let bytes = key.to_string().into_bytes();
            state.content.insert(key, bytes);
        }
        state.gallery.add_album(album);
    }

    /// Overwrite the stored content of a photo.
    pub fn set_content(&self, key: PhotoKey, bytes: Vec<u8>) {
        self.state().content.insert(key, bytes);
    }

    /// Stored content of a photo, if any.
    pub fn content(&self, key: &PhotoKey) -> Option<Vec<u8>> {
        self.state().content.get(key).cloned()
    }

    /// Make every `kind` operation on `resource` fail.
    ///
    /// `resource` is the rendered [`sync_core::ResourceKey`]: `"a1"` for album
    /// operations, `"a1/p1"` for photo operations.
    pub fn fail_on(&self, kind: OperationKind, resource: &str) {
        self.state().failures.insert((kind, resource.to_string()));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Delay every mutation by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    /// Mutations applied so far, in completion order.
    pub fn journal(&self) -> Vec<Operation> {
        self.state().journal.clone()
    }

    /// Highest number of mutations observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.state().max_in_flight
    }

    /// Snapshot of the stored gallery.
    pub fn gallery(&self) -> Gallery {
        self.state().gallery.snapshot()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the common prelude of a mutation: injected failure check,
    /// in-flight accounting, and the configured latency.
    async fn enter(&self, operation: &Operation) -> Result<InFlight<'_>, EndpointError> {
        let latency = {
            let mut state = self.state();
            let resource = operation.resource().to_string();
            if state.failures.contains(&(operation.kind(), resource)) {
                return Err(EndpointError::Injected(operation.to_string()));
            }
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.latency
        };
        let guard = InFlight(self);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(guard)
    }

    fn commit(&self, state: &mut MemoryState, operation: Operation) {
        tracing::trace!(endpoint = %self.name, %operation, "applied");
        state.journal.push(operation);
    }
}

struct InFlight<'a>(&'a MemoryEndpoint);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.state().in_flight -= 1;
    }
}

fn missing_album(id: &AlbumId) -> EndpointError {
    EndpointError::AlbumNotFound(id.clone())
}

#[async_trait]
impl PhotoSource for MemoryEndpoint {
    async fn read_photo(&self, photo: &Photo) -> Result<Vec<u8>, EndpointError> {
        self.content(&photo.key())
            .ok_or_else(|| EndpointError::PhotoNotFound(photo.key()))
    }
}

#[async_trait]
impl Endpoint for MemoryEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current_gallery(&self) -> Result<Gallery, EndpointError> {
        Ok(self.gallery())
    }

    async fn add_album(
        &self,
        album: &Album,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError> {
        let operation = Operation::AddAlbum(album.snapshot());
        let _guard = self.enter(&operation).await?;

        let mut content = Vec::with_capacity(album.len());
        for photo in album.photos() {
            content.push((photo.key(), source.read_photo(photo).await?));
        }

        let mut state = self.state();
        state.content.retain(|key, _| &key.album_id != album.id());
        state.content.extend(content);
        state.gallery.add_album(album.snapshot());
        self.commit(&mut state, operation);
        Ok(())
    }

    async fn remove_album(&self, album: &Album) -> Result<(), EndpointError> {
        let operation = Operation::RemoveAlbum(album.snapshot());
        let _guard = self.enter(&operation).await?;

        let mut state = self.state();
        state
            .gallery
            .remove_album(album.id())
            .ok_or_else(|| missing_album(album.id()))?;
        state.content.retain(|key, _| &key.album_id != album.id());
        self.commit(&mut state, operation);
        Ok(())
    }

    async fn add_photo(
        &self,
        photo: &Photo,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError> {
        let operation = Operation::AddPhoto(photo.clone());
        let _guard = self.enter(&operation).await?;
        let bytes = source.read_photo(photo).await?;

        let mut state = self.state();
        state
            .gallery
            .album_mut(photo.album_id())
            .ok_or_else(|| missing_album(photo.album_id()))?
            .insert_photo(photo.clone());
        state.content.insert(photo.key(), bytes);
        self.commit(&mut state, operation);
        Ok(())
    }

    async fn delete_photo(&self, photo: &Photo) -> Result<(), EndpointError> {
        let operation = Operation::DeletePhoto(photo.clone());
        let _guard = self.enter(&operation).await?;

        let mut state = self.state();
        state
            .gallery
            .album_mut(photo.album_id())
            .ok_or_else(|| missing_album(photo.album_id()))?
            .remove_photo(photo.id())
            .ok_or_else(|| EndpointError::PhotoNotFound(photo.key()))?;
        state.content.remove(&photo.key());
        self.commit(&mut state, operation);
        Ok(())
    }

    async fn update_photo(
        &self,
        photo: &Photo,
        source: &dyn PhotoSource,
    ) -> Result<(), EndpointError> {
        let operation = Operation::UpdatePhoto(photo.clone());
        let _guard = self.enter(&operation).await?;
        let bytes = source.read_photo(photo).await?;

        let mut state = self.state();
        let album = state
            .gallery
            .album_mut(photo.album_id())
            .ok_or_else(|| missing_album(photo.album_id()))?;
        if !album.contains(photo.id()) {
            return Err(EndpointError::PhotoNotFound(photo.key()));
        }
        album.insert_photo(photo.clone());
        state.content.insert(photo.key(), bytes);
        self.commit(&mut state, operation);
        Ok(())
    }

    async fn update_album_metadata(
        &self,
        album_id: &AlbumId,
        metadata: &AlbumMetadata,
    ) -> Result<(), EndpointError> {
        let operation = Operation::UpdateAlbumMetadata {
            album_id: album_id.clone(),
            metadata: metadata.clone(),
        };
        let _guard = self.enter(&operation).await?;

        let mut state = self.state();
        state
            .gallery
            .album_mut(album_id)
            .ok_or_else(|| missing_album(album_id))?
            .set_metadata(metadata.clone());
        self.commit(&mut state, operation);
        Ok(())
    }
}
