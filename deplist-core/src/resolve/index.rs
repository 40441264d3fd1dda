// deplist-core/src/resolve/index.rs
//! Resolves packages from a JSON index saved ahead of time, e.g. from
//! `go list -json`. The file is an object keyed by package identifier:
//!
//! ```json
//! { "example.com/a": { "Name": "a", "Dir": "/src/a", "GoFiles": ["a.go"] } }
//! ```
//!
//! The index is already specific to one build context, so the context passed
//! to [`IndexResolver::resolve`] is ignored.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use deplist_common::config::BuildContext;
use deplist_common::error::{DeplistError, Result};
use deplist_common::model::{PackageId, PackageInfo};
use deplist_common::resolver::PackageResolver;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct IndexResolver {
    packages: HashMap<PackageId, PackageInfo>,
}

impl IndexResolver {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            DeplistError::Config(format!("failed to read package index {}: {e}", path.display()))
        })?;
        let packages: HashMap<PackageId, PackageInfo> =
            serde_json::from_str(&raw).map_err(|e| {
                DeplistError::Config(format!("invalid package index {}: {e}", path.display()))
            })?;
        debug!(
            "Loaded package index {} with {} packages",
            path.display(),
            packages.len()
        );
        Ok(Self::from_packages(packages))
    }

    pub fn from_packages<I>(packages: I) -> Self
    where
        I: IntoIterator<Item = (PackageId, PackageInfo)>,
    {
        Self {
            packages: packages.into_iter().collect(),
        }
    }
}

impl PackageResolver for IndexResolver {
    fn resolve(&self, id: &str, _ctx: &BuildContext) -> Result<PackageInfo> {
        let mut pkg = self
            .packages
            .get(id)
            .cloned()
            .ok_or_else(|| DeplistError::resolve(id, "package not found in index"))?;
        if pkg.import_path.is_empty() {
            pkg.import_path = id.to_string();
        }
        Ok(pkg)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn loads_index_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "example.com/a": {{
                    "Name": "a",
                    "Dir": "/src/a",
                    "Target": "/pkg/a.a",
                    "GoFiles": ["a.go"],
                    "Imports": ["example.com/b"]
                }},
                "example.com/b": {{ "Name": "b" }}
            }}"#
        )
        .unwrap();

        let index = IndexResolver::load(file.path()).unwrap();
        assert!(index.resolve("example.com/b", &BuildContext::host()).is_ok());

        let a = index.resolve("example.com/a", &BuildContext::host()).unwrap();
        assert_eq!(a.import_path, "example.com/a");
        assert_eq!(a.target, PathBuf::from("/pkg/a.a"));
        assert_eq!(a.imports, vec!["example.com/b"]);
    }

    #[test]
    fn unknown_package_is_a_resolve_error() {
        let index = IndexResolver::default();
        let err = index.resolve("nope", &BuildContext::host()).unwrap_err();
        assert_eq!(err.package(), Some("nope"));
    }

    #[test]
    fn malformed_index_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();
        let err = IndexResolver::load(file.path()).unwrap_err();
        assert!(matches!(err, DeplistError::Config(_)));
    }

    #[test]
    fn missing_index_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexResolver::load(&dir.path().join("index.json")).unwrap_err();
        assert!(matches!(err, DeplistError::Config(_)));
    }
}
