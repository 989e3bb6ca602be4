//! Show what a sync pass would do, without changing the target.

use anyhow::{Context, Result};
use std::path::Path;
use sync_client::{SyncConfig, SyncPlan, Synchronizer};

use super::endpoint;

/// Run the diff command.
pub async fn run(source: &Path, target: &Path, json: bool) -> Result<()> {
    let sync = Synchronizer::new(endpoint(source), endpoint(target), SyncConfig::default());
    let plan = sync.plan().await.context("Failed to compute diff")?;
    print!("{}", render(&plan, json)?);
    Ok(())
}

fn render(plan: &SyncPlan, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(plan)?;
        out.push('\n');
        return Ok(out);
    }

    if plan.is_empty() {
        return Ok("Target is up to date.\n".to_string());
    }
    let mut out = String::new();
    for operation in &plan.operations {
        out.push_str(&format!("  {}\n", operation));
    }
    out.push_str(&format!("{}\n", plan.summary()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, rel).unwrap();
    }

    #[tokio::test]
    async fn plan_lists_operations_in_dispatch_order() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "a1/p1.jpg");
        write(src.path(), "a2/p1.jpg");
        write(dst.path(), "a1/p2.jpg");
        write(dst.path(), "a9/p1.jpg");

        let sync = Synchronizer::new(
            endpoint(src.path()),
            endpoint(dst.path()),
            SyncConfig::default(),
        );
        let text = render(&sync.plan().await.unwrap(), false).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "  remove album a9",
                "  add album a2",
                "  delete photo a1/p2.jpg",
                "  add photo a1/p1.jpg",
                "albums +1 -1 ~1, photos +1 -1 ~0, album metadata ~0",
            ]
        );
        assert!(dst.path().join("a9/p1.jpg").exists());
    }

    #[tokio::test]
    async fn identical_galleries_are_up_to_date() {
        let src = tempdir().unwrap();
        write(src.path(), "a1/p1.jpg");

        let sync = Synchronizer::new(
            endpoint(src.path()),
            endpoint(src.path()),
            SyncConfig::default(),
        );
        let plan = sync.plan().await.unwrap();

        assert_eq!(render(&plan, false).unwrap(), "Target is up to date.\n");
        let json: serde_json::Value =
            serde_json::from_str(&render(&plan, true).unwrap()).unwrap();
        assert_eq!(json["operations"], serde_json::json!([]));
    }
}
