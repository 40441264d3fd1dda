// deplist-common/src/config.rs
use std::env;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

/// A Go-style `GOOS`/`GOARCH` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process is running on, in Go naming.
    pub fn host() -> Self {
        Self::new(go_os(env::consts::OS), go_arch(env::consts::ARCH))
    }

    /// `<goos>_<goarch>`, the directory name the go tool uses for
    /// cross-compiled binaries.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn go_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn go_arch(arch: &str) -> &str {
    let little = cfg!(target_endian = "little");
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "wasm32" => "wasm",
        "powerpc" => "ppc",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        other => other,
    }
}

/// Everything the package resolver needs to know about the build.
///
/// Assembled once at startup and shared read-only with every visitor.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub target: Platform,
    pub host: Platform,
    pub build_tags: Vec<String>,
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub cgo_enabled: Option<bool>,
}

impl BuildContext {
    /// A context targeting the host with no tags and no explicit source roots.
    pub fn host() -> Self {
        let host = Platform::host();
        Self {
            target: host.clone(),
            host,
            build_tags: Vec::new(),
            goroot: None,
            gopath: Vec::new(),
            cgo_enabled: None,
        }
    }

    pub fn from_env(build_tags: Vec<String>) -> Self {
        Self::from_lookup(build_tags, |key| env::var(key).ok())
    }

    /// Builds the context from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(build_tags: Vec<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading build context");
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = Platform::host();
        let target = Platform::new(
            var("GOOS").unwrap_or_else(|| host.os.clone()),
            var("GOARCH").unwrap_or_else(|| host.arch.clone()),
        );
        let goroot = var("GOROOT").map(PathBuf::from);
        let gopath = var("GOPATH")
            .map(|v| env::split_paths(&v).collect())
            .unwrap_or_default();
        let cgo_enabled = var("CGO_ENABLED").map(|v| v == "1");

        debug!(
            "Build context: target={} host={} tags={:?}",
            target, host, build_tags
        );
        Self {
            target,
            host,
            build_tags,
            goroot,
            gopath,
            cgo_enabled,
        }
    }

    pub fn with_target(mut self, target: Platform) -> Self {
        self.target = target;
        self
    }

    pub fn with_tags(mut self, build_tags: Vec<String>) -> Self {
        self.build_tags = build_tags;
        self
    }

    pub fn is_cross_compiling(&self) -> bool {
        self.target != self.host
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

/// Splits a `--tags` value on spaces. Empty tokens are dropped.
pub fn parse_tags(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
