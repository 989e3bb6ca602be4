//! Run one sync pass from a source gallery into a target gallery.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use sync_client::{ErrorPolicy, SyncConfig, SyncError, SyncReport, Synchronizer};

use super::endpoint;

/// Resolved options for one pass.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Synchronizer settings.
    pub config: SyncConfig,
    /// Abandon the pass after this long.
    pub timeout: Option<Duration>,
}

/// Run the sync command.
pub async fn run(source: &Path, target: &Path, options: SyncOptions) -> Result<()> {
    let report = sync_once(source, target, options).await?;
    print!("{}", render(&report));
    if !report.is_clean() {
        anyhow::bail!("{} operation(s) failed", report.failures.len());
    }
    Ok(())
}

async fn sync_once(source: &Path, target: &Path, options: SyncOptions) -> Result<SyncReport> {
    if !source.is_dir() {
        anyhow::bail!("Source {} is not a directory", source.display());
    }
    tokio::fs::create_dir_all(target)
        .await
        .with_context(|| format!("Failed to create target {}", target.display()))?;

    let sync = Synchronizer::new(endpoint(source), endpoint(target), options.config);
    let pass = sync.sync();
    let outcome = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, pass).await.with_context(|| {
            format!(
                "Sync pass timed out after {}s; target may be partially updated",
                limit.as_secs()
            )
        })?,
        None => pass.await,
    };

    match outcome {
        Ok(report) => Ok(report),
        Err(SyncError::Dispatch { report }) => {
            print!("{}", render(&report));
            Err(anyhow::anyhow!(SyncError::Dispatch { report }))
        }
        Err(err) => Err(err).context("Sync pass failed"),
    }
}

fn render(report: &SyncReport) -> String {
    let mut out = format!("{}\n", report.summary);
    for failure in &report.failures {
        out.push_str(&format!(
            "  failed: {} {}: {}\n",
            failure.kind, failure.resource, failure.error
        ));
    }
    out.push_str(&format!(
        "{} applied, {} failed, {} skipped in {:.2}s\n",
        report.applied,
        report.failures.len(),
        report.skipped,
        report.elapsed.as_secs_f64()
    ));
    out
}

/// Merge command-line flags over configured values.
pub fn resolve(
    config: SyncConfig,
    configured_timeout: Option<u64>,
    concurrency: Option<usize>,
    best_effort: bool,
    timeout_secs: Option<u64>,
) -> SyncOptions {
    let mut config = config;
    if let Some(concurrency) = concurrency {
        config = config.with_concurrency(concurrency);
    }
    if best_effort {
        config = config.with_error_policy(ErrorPolicy::ContinueBestEffort);
    }
    SyncOptions {
        config,
        timeout: timeout_secs
            .or(configured_timeout)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
    }
}
