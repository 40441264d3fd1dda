// deplist-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;

// Re-export key types
pub use config::{BuildContext, Platform};
pub use error::{DeplistError, Result};
pub use model::{PackageId, PackageInfo, PackageKind, SourceFiles};
pub use resolver::PackageResolver;
