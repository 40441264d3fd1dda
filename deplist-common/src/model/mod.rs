// deplist-common/src/model/mod.rs
pub mod package;

// Re-export
pub use package::{PackageInfo, PackageKind, SourceFiles};

/// Opaque name of a package within the build context.
pub type PackageId = String;
