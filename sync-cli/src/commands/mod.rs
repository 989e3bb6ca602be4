//! CLI command implementations.

pub mod diff;
pub mod init_config;
pub mod list;
pub mod sync;

use std::path::Path;
use std::sync::Arc;

use sync_client::Endpoint;
use sync_content::FsEndpoint;

/// Filesystem endpoint for a gallery root given on the command line.
pub fn endpoint(root: &Path) -> Arc<dyn Endpoint> {
    Arc::new(FsEndpoint::new(root))
}
