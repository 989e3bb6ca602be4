//! The synchronizer: one-way sync from a source endpoint into a target.
//!
//! A pass reads both snapshots, diffs target against source, expands the
//! patch into operations, and dispatches them to the target over a bounded
//! pool of concurrent workers.
//!
//! ```text
//! source ──┐
//!          ├─ current_gallery() ─→ diff_gallery(target, source) ─→ plan()
//! target ──┘                                                         │
//!                              buffer_unordered(concurrency) ←───────┘
//!                                        │
//!                                        └─→ target.add_photo(...) etc.
//! ```
//!
//! A pass is not atomic. Operations applied before a failure stay applied;
//! running the pass again converges the rest.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use sync_core::{
    diff_gallery, plan, GalleryPatch, Operation, OperationKind, PatchSummary, ResourceKey,
};
use sync_types::{Gallery, Photo};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::endpoint::{Endpoint, EndpointError, PhotoSource};

/// Default number of operations dispatched at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What to do with the rest of a pass after an operation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Start no new operations; in-flight ones finish.
    #[default]
    Abort,
    /// Run every operation and report all failures.
    #[serde(rename = "continue", alias = "continue_best_effort")]
    ContinueBestEffort,
}

/// Synchronizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum operations in flight (at least 1).
    pub concurrency: usize,
    /// Failure propagation policy.
    pub error_policy: ErrorPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Set the worker count; values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// A computed but not yet executed pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPlan {
    /// Difference from target to source.
    pub patch: GalleryPatch,
    /// Operations that would be dispatched, in plan order.
    pub operations: Vec<Operation>,
}

impl SyncPlan {
    /// True if the target already matches the source.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Counts of the patch's changes.
    pub fn summary(&self) -> PatchSummary {
        self.patch.summary()
    }
}

/// One operation that failed.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    /// Operation kind.
    pub kind: OperationKind,
    /// Resource it touched.
    pub resource: ResourceKey,
    /// Rendered endpoint error.
    pub error: String,
}

/// Outcome of a sync pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Counts of the dispatched patch.
    pub summary: PatchSummary,
    /// Operations that succeeded.
    pub applied: usize,
    /// Operations never started because the pass aborted.
    pub skipped: usize,
    /// Operations that failed.
    pub failures: Vec<DispatchFailure>,
    /// Wall time of the pass, snapshot reads included.
    pub elapsed: Duration,
}

impl SyncReport {
    /// True if every planned operation was applied.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Synchronizer errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading a snapshot failed; nothing was dispatched.
    #[error("failed to read gallery from {endpoint}: {source}")]
    Snapshot {
        /// Endpoint name.
        endpoint: String,
        /// Underlying error.
        #[source]
        source: EndpointError,
    },

    /// The pass aborted after an operation failed.
    #[error(
        "sync aborted: {} operation(s) failed, {} applied, {} skipped",
        report.failures.len(),
        report.applied,
        report.skipped
    )]
    Dispatch {
        /// What was done before the abort.
        report: Box<SyncReport>,
    },
}

enum Outcome {
    Applied,
    Skipped,
    Failed(DispatchFailure),
}

/// Content reads from the source endpoint.
struct SourceContent<'a>(&'a dyn Endpoint);

#[async_trait]
impl<'a> PhotoSource for SourceContent<'a> {
    async fn read_photo(&self, photo: &Photo) -> Result<Vec<u8>, EndpointError> {
        self.0.read_photo(photo).await
    }
}

/// Keeps a target endpoint in step with a source endpoint.
pub struct Synchronizer {
    source: Arc<dyn Endpoint>,
    target: Arc<dyn Endpoint>,
    config: SyncConfig,
}

impl Synchronizer {
    /// Create a synchronizer copying `source` into `target`.
    pub fn new(
        source: Arc<dyn Endpoint>,
        target: Arc<dyn Endpoint>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            target,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Compute what a pass would do, without touching the target.
    pub async fn plan(&self) -> Result<SyncPlan, SyncError> {
        let (source, target) = tokio::try_join!(
            snapshot(self.source.as_ref()),
            snapshot(self.target.as_ref())
        )?;

        let patch = diff_gallery(&target, &source);
        let operations = plan(&patch);
        debug!(
            source = self.source.name(),
            target = self.target.name(),
            operations = operations.len(),
            "planned sync pass"
        );
        Ok(SyncPlan { patch, operations })
    }

    /// Run one full pass: plan, then dispatch.
    ///
    /// Dropping the returned future abandons outstanding operations.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let plan = self.plan().await?;
        self.dispatch(plan, started).await
    }

    /// Dispatch a previously computed plan.
    ///
    /// The plan should be fresh; operations are not re-validated against
    /// the target.
    pub async fn execute(&self, plan: SyncPlan) -> Result<SyncReport, SyncError> {
        self.dispatch(plan, Instant::now()).await
    }

    async fn dispatch(
        &self,
        plan: SyncPlan,
        started: Instant,
    ) -> Result<SyncReport, SyncError> {
        let summary = plan.summary();
        info!(
            source = self.source.name(),
            target = self.target.name(),
            operations = plan.operations.len(),
            concurrency = self.config.concurrency,
            %summary,
            "starting sync pass"
        );

        let abort = AtomicBool::new(false);
        let outcomes: Vec<Outcome> = stream::iter(plan.operations)
            .map(|operation| self.run(operation, &abort))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = SyncReport {
            summary,
            applied: 0,
            skipped: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Applied => report.applied += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed(failure) => report.failures.push(failure),
            }
        }
        report.elapsed = started.elapsed();

        info!(
            applied = report.applied,
            failed = report.failures.len(),
            skipped = report.skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "sync pass finished"
        );

        if abort.load(Ordering::SeqCst) {
            return Err(SyncError::Dispatch {
                report: Box::new(report),
            });
        }
        Ok(report)
    }

    async fn run(&self, operation: Operation, abort: &AtomicBool) -> Outcome {
        if abort.load(Ordering::SeqCst) {
            debug!(%operation, "skipped after abort");
            return Outcome::Skipped;
        }

        match self.apply(&operation).await {
            Ok(()) => {
                debug!(%operation, "applied");
                Outcome::Applied
            }
            Err(error) => {
                warn!(%operation, %error, "operation failed");
                if self.config.error_policy == ErrorPolicy::Abort {
                    abort.store(true, Ordering::SeqCst);
                }
                Outcome::Failed(DispatchFailure {
                    kind: operation.kind(),
                    resource: operation.resource(),
                    error: error.to_string(),
                })
            }
        }
    }

    async fn apply(&self, operation: &Operation) -> Result<(), EndpointError> {
        let source = SourceContent(self.source.as_ref());
        let target = self.target.as_ref();
        match operation {
            Operation::RemoveAlbum(album) => target.remove_album(album).await,
            Operation::AddAlbum(album) => target.add_album(album, &source).await,
            Operation::DeletePhoto(photo) => target.delete_photo(photo).await,
            Operation::AddPhoto(photo) => target.add_photo(photo, &source).await,
            Operation::UpdatePhoto(photo) => target.update_photo(photo, &source).await,
            Operation::UpdateAlbumMetadata { album_id, metadata } => {
                target.update_album_metadata(album_id, metadata).await
            }
        }
    }
}

async fn snapshot(endpoint: &dyn Endpoint) -> Result<Gallery, SyncError> {
    endpoint
        .current_gallery()
        .await
        .map_err(|source| SyncError::Snapshot {
            endpoint: endpoint.name().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryEndpoint;
    use sync_types::{Album, AlbumId, AlbumMetadata, PhotoId, PhotoMetadata};

    fn album(id: &str, photos: &[(&str, Option<&str>)]) -> Album {
        let mut album = Album::new(AlbumId::new(id));
        for (photo, name) in photos {
            let mut metadata = PhotoMetadata::default();
            metadata.name = name.map(str::to_string);
            album.add_photo(*photo, metadata);
        }
        album
    }

    fn endpoint(name: &str, albums: Vec<Album>) -> MemoryEndpoint {
        let endpoint = MemoryEndpoint::new(name);
        for album in albums {
            endpoint.seed_album(album);
        }
        endpoint
    }

    fn synchronizer(
        source: &MemoryEndpoint,
        target: &MemoryEndpoint,
        config: SyncConfig,
    ) -> Synchronizer {
        Synchronizer::new(Arc::new(source.clone()), Arc::new(target.clone()), config)
    }

    /// Source gains five photos in album a1 that the target lacks.
    fn five_new_photos() -> (MemoryEndpoint, MemoryEndpoint) {
        let photos = [
            ("p1", None),
            ("p2", None),
            ("p3", None),
            ("p4", None),
            ("p5", None),
        ];
        let source = endpoint("source", vec![album("a1", &photos)]);
        let target = endpoint("target", vec![album("a1", &[])]);
        (source, target)
    }

    // ===========================================
    // Convergence Tests
    // ===========================================

    #[tokio::test]
    async fn sync_scenario_converges_target() {
        let source = endpoint(
            "source",
            vec![
                album("a1", &[("x", None)]),
                album("a2", &[("p1", None), ("p2", Some("renamed")), ("p3", None)]),
                album("a3", &[("q1", None)]),
            ],
        );
        let target = endpoint(
            "target",
            vec![
                album("a1", &[("x", None)]),
                album("a2", &[("p1", None), ("p2", None), ("p4", None)]),
            ],
        );

        let report = synchronizer(&source, &target, SyncConfig::default())
            .sync()
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.applied, 4);

        let after = target.gallery();
        let ids: Vec<&str> = after.albums().map(|a| a.id().as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        let a2 = after.album(&AlbumId::new("a2")).unwrap();
        let photos: Vec<&str> = a2.photo_ids().map(|p| p.as_str()).collect();
        assert_eq!(photos, vec!["p1", "p2", "p3"]);
        assert_eq!(
            a2.photo(&PhotoId::new("p2")).unwrap().name(),
            Some("renamed")
        );
        assert!(diff_gallery(&after, &source.gallery()).is_empty());
    }

    #[tokio::test]
    async fn dispatch_uses_whole_album_and_photo_operations() {
        let source = endpoint(
            "source",
            vec![
                album("a2", &[("p1", None), ("p3", None)]),
                album("a3", &[("q1", None), ("q2", None)]),
            ],
        );
        let target = endpoint(
            "target",
            vec![album("a2", &[("p1", None)]), album("a9", &[("z", None)])],
        );

        synchronizer(&source, &target, SyncConfig::default().with_concurrency(1))
            .sync()
            .await
            .unwrap();

        let journal: Vec<String> = target.journal().iter().map(|op| op.to_string()).collect();
        assert_eq!(
            journal,
            vec!["remove album a9", "add album a3", "add photo a2/p3"]
        );
    }

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let (source, target) = five_new_photos();
        let sync = synchronizer(&source, &target, SyncConfig::default());

        sync.sync().await.unwrap();
        let report = sync.sync().await.unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.summary, PatchSummary::default());
        assert_eq!(target.journal().len(), 5);
    }

    #[tokio::test]
    async fn album_metadata_is_synced() {
        let holidays = AlbumMetadata::default().with_name("Holidays").with_rank(2);
        let source = endpoint(
            "source",
            vec![album("a1", &[("p1", None)]).with_metadata(holidays.clone())],
        );
        let target = endpoint("target", vec![album("a1", &[("p1", None)])]);

        synchronizer(&source, &target, SyncConfig::default())
            .sync()
            .await
            .unwrap();

        let after = target.gallery();
        assert_eq!(
            after.album(&AlbumId::new("a1")).unwrap().metadata(),
            &holidays
        );
    }

    #[tokio::test]
    async fn added_album_content_is_copied() {
        let source = endpoint("source", vec![album("a1", &[("p1", None)])]);
        let key = sync_types::PhotoKey::new(AlbumId::new("a1"), PhotoId::new("p1"));
        source.set_content(key.clone(), b"raw image".to_vec());
        let target = MemoryEndpoint::new("target");

        synchronizer(&source, &target, SyncConfig::default())
            .sync()
            .await
            .unwrap();

        assert_eq!(target.content(&key), Some(b"raw image".to_vec()));
    }

    // ===========================================
    // Dry Run Tests
    // ===========================================

    #[tokio::test]
    async fn plan_does_not_touch_target() {
        let (source, target) = five_new_photos();
        let sync = synchronizer(&source, &target, SyncConfig::default());

        let plan = sync.plan().await.unwrap();

        assert_eq!(plan.operations.len(), 5);
        assert_eq!(plan.summary().photos_added, 5);
        assert!(target.journal().is_empty());

        let report = sync.execute(plan).await.unwrap();
        assert_eq!(report.applied, 5);
    }

    #[tokio::test]
    async fn identical_endpoints_plan_nothing() {
        let source = endpoint("source", vec![album("a1", &[("p1", Some("x"))])]);
        let target = endpoint("target", vec![album("a1", &[("p1", Some("x"))])]);

        let plan = synchronizer(&source, &target, SyncConfig::default())
            .plan()
            .await
            .unwrap();

        assert!(plan.is_empty());
        assert!(plan.patch.is_empty());
    }

    // ===========================================
    // Error Policy Tests
    // ===========================================

    #[tokio::test]
    async fn abort_skips_operations_not_yet_started() {
        let (source, target) = five_new_photos();
        target.fail_on(OperationKind::AddPhoto, "a1/p1");
        let config = SyncConfig::default().with_concurrency(1);

        let err = synchronizer(&source, &target, config)
            .sync()
            .await
            .unwrap_err();

        match err {
            SyncError::Dispatch { report } => {
                assert_eq!(report.failures.len(), 1);
                assert_eq!(report.failures[0].kind, OperationKind::AddPhoto);
                assert_eq!(report.failures[0].resource.to_string(), "a1/p1");
                assert_eq!(report.applied, 0);
                assert_eq!(report.skipped, 4);
                assert!(!report.is_clean());
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(target.gallery().photo_count(), 0);
    }

    #[tokio::test]
    async fn abort_keeps_operations_applied_before_failure() {
        let (source, target) = five_new_photos();
        target.fail_on(OperationKind::AddPhoto, "a1/p3");
        let config = SyncConfig::default().with_concurrency(1);

        let err = synchronizer(&source, &target, config)
            .sync()
            .await
            .unwrap_err();

        let SyncError::Dispatch { report } = err else {
            panic!("expected dispatch error");
        };
        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(target.gallery().photo_count(), 2);
    }

    #[tokio::test]
    async fn best_effort_runs_every_operation() {
        let (source, target) = five_new_photos();
        target.fail_on(OperationKind::AddPhoto, "a1/p2");
        target.fail_on(OperationKind::AddPhoto, "a1/p4");
        let config = SyncConfig::default()
            .with_concurrency(1)
            .with_error_policy(ErrorPolicy::ContinueBestEffort);

        let report = synchronizer(&source, &target, config).sync().await.unwrap();

        assert_eq!(report.applied, 3);
        assert_eq!(report.skipped, 0);
        let mut failed: Vec<String> = report
            .failures
            .iter()
            .map(|f| f.resource.to_string())
            .collect();
        failed.sort();
        assert_eq!(failed, vec!["a1/p2", "a1/p4"]);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn failed_operations_converge_on_next_pass() {
        let (source, target) = five_new_photos();
        target.fail_on(OperationKind::AddPhoto, "a1/p2");
        let config = SyncConfig::default().with_error_policy(ErrorPolicy::ContinueBestEffort);
        let sync = synchronizer(&source, &target, config);

        let first = sync.sync().await.unwrap();
        assert_eq!(first.failures.len(), 1);

        target.clear_failures();
        let second = sync.sync().await.unwrap();
        assert_eq!(second.applied, 1);
        assert!(second.is_clean());
        assert_eq!(target.gallery().photo_count(), 5);
    }

    #[test]
    fn dispatch_error_message_counts_outcomes() {
        let err = SyncError::Dispatch {
            report: Box::new(SyncReport {
                summary: PatchSummary::default(),
                applied: 3,
                skipped: 2,
                failures: vec![DispatchFailure {
                    kind: OperationKind::DeletePhoto,
                    resource: ResourceKey::Album(AlbumId::new("a1")),
                    error: "boom".into(),
                }],
                elapsed: Duration::from_millis(5),
            }),
        };
        assert_eq!(
            err.to_string(),
            "sync aborted: 1 operation(s) failed, 3 applied, 2 skipped"
        );
    }

    // ===========================================
    // Concurrency Tests
    // ===========================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dispatch_is_bounded_by_concurrency() {
        let (source, target) = five_new_photos();
        target.set_latency(Duration::from_millis(20));
        let config = SyncConfig::default().with_concurrency(3);

        synchronizer(&source, &target, config).sync().await.unwrap();

        assert_eq!(target.max_in_flight(), 3);
        assert_eq!(target.gallery().photo_count(), 5);
    }

    #[tokio::test]
    async fn concurrency_of_one_is_sequential() {
        let (source, target) = five_new_photos();
        target.set_latency(Duration::from_millis(5));
        let config = SyncConfig::default().with_concurrency(1);

        synchronizer(&source, &target, config).sync().await.unwrap();

        assert_eq!(target.max_in_flight(), 1);
    }

    #[test]
    fn zero_concurrency_is_raised_to_one() {
        assert_eq!(SyncConfig::default().with_concurrency(0).concurrency, 1);
        assert_eq!(SyncConfig::default().concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(SyncConfig::default().error_policy, ErrorPolicy::Abort);
    }
}
