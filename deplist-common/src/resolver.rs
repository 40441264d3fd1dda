// deplist-common/src/resolver.rs
//! The seam between the traversal engine and whatever knows how to read
//! package metadata.

use crate::config::BuildContext;
use crate::error::Result;
use crate::model::PackageInfo;

/// Maps a package identifier to its metadata under a build context.
///
/// Implementations are called from the blocking pool and may perform slow,
/// synchronous I/O. A returned error is fatal for the whole run, so there is
/// no distinction between "not found" and an I/O failure.
pub trait PackageResolver: Send + Sync {
    fn resolve(&self, id: &str, ctx: &BuildContext) -> Result<PackageInfo>;
}
