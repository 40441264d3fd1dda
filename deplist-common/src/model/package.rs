// deplist-common/src/model/package.rs
//! Package metadata as reported by a resolver.
//!
//! Field names follow the JSON emitted by `go list -json`, so the same model
//! decodes both live `go list` output and a saved package index.

use std::path::PathBuf;

use serde::Deserialize;

use super::PackageId;

/// Declared package name that marks an executable.
pub const PROGRAM_PACKAGE_NAME: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Program,
    Library,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageInfo {
    #[serde(default)]
    pub import_path: PackageId,
    #[serde(default)]
    pub name: String,
    /// Directory holding the package sources.
    #[serde(default)]
    pub dir: PathBuf,
    /// Source root (GOROOT or GOPATH entry) containing the package.
    #[serde(default)]
    pub root: PathBuf,
    /// Install path of the compiled package. May be empty.
    #[serde(default)]
    pub target: PathBuf,
    #[serde(default)]
    pub imports: Vec<PackageId>,
    #[serde(flatten)]
    pub sources: SourceFiles,
}

impl PackageInfo {
    pub fn kind(&self) -> PackageKind {
        if self.name == PROGRAM_PACKAGE_NAME {
            PackageKind::Program
        } else {
            PackageKind::Library
        }
    }
}

/// Source file names relative to the package directory, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceFiles {
    #[serde(default)]
    pub go_files: Vec<String>,
    #[serde(default)]
    pub cgo_files: Vec<String>,
    #[serde(default)]
    pub c_files: Vec<String>,
    #[serde(default, rename = "CXXFiles")]
    pub cxx_files: Vec<String>,
    #[serde(default)]
    pub h_files: Vec<String>,
    #[serde(default)]
    pub s_files: Vec<String>,
    #[serde(default)]
    pub swig_files: Vec<String>,
    #[serde(default, rename = "SwigCXXFiles")]
    pub swig_cxx_files: Vec<String>,
}

impl SourceFiles {
    /// All categories in output order. The order is part of the output
    /// format and must not change between runs.
    pub fn in_order(&self) -> [&[String]; 8] {
        [
            &self.go_files,
            &self.cgo_files,
            &self.c_files,
            &self.cxx_files,
            &self.h_files,
            &self.s_files,
            &self.swig_files,
            &self.swig_cxx_files,
        ]
    }
}
