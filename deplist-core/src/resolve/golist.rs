// deplist-core/src/resolve/golist.rs
//! Resolves packages by asking the go tool: `go list -json <pkg>` with the
//! build context applied through the environment.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use deplist_common::config::BuildContext;
use deplist_common::error::{DeplistError, Result};
use deplist_common::model::{PackageInfo, PackageKind};
use deplist_common::resolver::PackageResolver;
use tracing::{debug, instrument};

/// Import path cgo uses for its pseudo-package. It has no sources of its own.
const CGO_PSEUDO_PACKAGE: &str = "C";

/// Environment variable that overrides the go executable.
pub const GO_BINARY_ENV: &str = "DEPLIST_GO";

#[derive(Debug, Clone)]
pub struct GoListResolver {
    go: PathBuf,
}

impl GoListResolver {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        Self { go: go.into() }
    }

    /// Uses `$DEPLIST_GO` if set, otherwise the first `go` on `PATH`.
    pub fn locate() -> Result<Self> {
        if let Some(go) = env::var_os(GO_BINARY_ENV).filter(|v| !v.is_empty()) {
            debug!("Using go from {}: {:?}", GO_BINARY_ENV, go);
            return Ok(Self::new(go));
        }
        let go = which::which("go")
            .map_err(|e| DeplistError::Config(format!("could not find the go tool: {e}")))?;
        debug!("Using go at {}", go.display());
        Ok(Self::new(go))
    }

    fn command(&self, id: &str, ctx: &BuildContext) -> Result<Command> {
        let mut cmd = Command::new(&self.go);
        cmd.arg("list").arg("-json");
        if !ctx.build_tags.is_empty() {
            cmd.arg(format!("-tags={}", ctx.build_tags.join(",")));
        }
        cmd.arg("--").arg(id);

        cmd.env("GOOS", &ctx.target.os);
        cmd.env("GOARCH", &ctx.target.arch);
        if let Some(goroot) = &ctx.goroot {
            cmd.env("GOROOT", goroot);
        }
        if !ctx.gopath.is_empty() {
            let joined = env::join_paths(&ctx.gopath)
                .map_err(|e| DeplistError::Config(format!("unusable GOPATH entry: {e}")))?;
            cmd.env("GOPATH", joined);
        }
        if let Some(cgo) = ctx.cgo_enabled {
            cmd.env("CGO_ENABLED", if cgo { "1" } else { "0" });
        }
        Ok(cmd)
    }
}

impl PackageResolver for GoListResolver {
    #[instrument(skip(self, ctx), fields(target = %ctx.target))]
    fn resolve(&self, id: &str, ctx: &BuildContext) -> Result<PackageInfo> {
        let output = self.command(id, ctx)?.output().map_err(|e| {
            DeplistError::resolve(id, format!("failed to run {}: {e}", self.go.display()))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeplistError::resolve(id, stderr.trim()));
        }
        parse_go_list(id, &output.stdout, ctx)
    }
}

/// Decodes the JSON `go list -json` prints for a single package.
///
/// `go list` leaves `Target` empty for packages it would not install (the
/// standard library since Go 1.20, for one). Libraries then get the
/// conventional archive path `<Root>/pkg/<goos>_<goarch>/<ImportPath>.a`.
pub fn parse_go_list(id: &str, stdout: &[u8], ctx: &BuildContext) -> Result<PackageInfo> {
    let mut pkg: PackageInfo = serde_json::from_slice(stdout)
        .map_err(|e| DeplistError::resolve(id, format!("unreadable go list output: {e}")))?;
    pkg.imports.retain(|import| import != CGO_PSEUDO_PACKAGE);

    if pkg.target.as_os_str().is_empty() && pkg.kind() == PackageKind::Library {
        if pkg.root.as_os_str().is_empty() {
            return Err(DeplistError::resolve(
                id,
                "go list reported neither Target nor Root",
            ));
        }
        let import_path = if pkg.import_path.is_empty() {
            id
        } else {
            pkg.import_path.as_str()
        };
        pkg.target = pkg
            .root
            .join("pkg")
            .join(ctx.target.dir_name())
            .join(format!("{import_path}.a"));
    }
    Ok(pkg)
}

#[cfg(test)]
mod tests {
    use deplist_common::config::Platform;

    use super::*;

    #[test]
    fn parses_package_and_drops_cgo_import() {
        let stdout = br#"{
            "Dir": "/home/u/go/src/example.com/net",
            "ImportPath": "example.com/net",
            "Name": "net",
            "Target": "/home/u/go/pkg/linux_amd64/example.com/net.a",
            "Root": "/home/u/go",
            "GoFiles": ["net.go"],
            "CgoFiles": ["cgo_unix.go"],
            "Imports": ["C", "errors", "syscall"]
        }"#;
        let pkg = parse_go_list("example.com/net", stdout, &BuildContext::host()).unwrap();
        assert_eq!(pkg.imports, vec!["errors", "syscall"]);
        assert_eq!(
            pkg.target,
            PathBuf::from("/home/u/go/pkg/linux_amd64/example.com/net.a")
        );
    }

    #[test]
    fn garbage_output_names_the_package() {
        let err = parse_go_list("example.com/x", b"not json", &BuildContext::host()).unwrap_err();
        assert_eq!(err.package(), Some("example.com/x"));
    }

    #[test]
    fn command_carries_build_context() {
        let ctx = BuildContext {
            goroot: Some(PathBuf::from("/usr/lib/go")),
            cgo_enabled: Some(false),
            ..BuildContext::host()
        }
        .with_target(Platform::new("linux", "arm64"))
        .with_tags(vec!["netgo".into(), "osusergo".into()]);

        let cmd = GoListResolver::new("/usr/bin/go")
            .command("example.com/x", &ctx)
            .unwrap();
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec!["list", "-json", "-tags=netgo,osusergo", "--", "example.com/x"]
        );

        let envs: Vec<(String, String)> = cmd
            .get_envs()
            .filter_map(|(k, v)| {
                Some((
                    k.to_string_lossy().into_owned(),
                    v?.to_string_lossy().into_owned(),
                ))
            })
            .collect();
        assert!(envs.contains(&("GOOS".into(), "linux".into())));
        assert!(envs.contains(&("GOARCH".into(), "arm64".into())));
        assert!(envs.contains(&("GOROOT".into(), "/usr/lib/go".into())));
        assert!(envs.contains(&("CGO_ENABLED".into(), "0".into())));
    }

    #[test]
    fn library_without_target_gets_archive_path() {
        let stdout = br#"{
            "Dir": "/goroot/src/strings",
            "ImportPath": "strings",
            "Name": "strings",
            "Root": "/goroot",
            "Goroot": true,
            "Standard": true,
            "GoFiles": ["builder.go"]
        }"#;
        let ctx = BuildContext::host().with_target(Platform::new("linux", "arm64"));
        let pkg = parse_go_list("strings", stdout, &ctx).unwrap();
        assert_eq!(
            pkg.target,
            PathBuf::from("/goroot/pkg/linux_arm64/strings.a")
        );
    }

    #[test]
    fn program_without_target_is_left_alone() {
        let stdout = br#"{"ImportPath": "example.com/cmd/x", "Name": "main", "Root": "/ws"}"#;
        let pkg = parse_go_list("example.com/cmd/x", stdout, &BuildContext::host()).unwrap();
        assert_eq!(pkg.target, PathBuf::new());
    }

    #[test]
    fn library_without_target_or_root_is_an_error() {
        let stdout = br#"{"ImportPath": "example.com/lib", "Name": "lib"}"#;
        let err = parse_go_list("example.com/lib", stdout, &BuildContext::host()).unwrap_err();
        assert_eq!(err.package(), Some("example.com/lib"));
    }

    #[cfg(unix)]
    #[test]
    fn unjoinable_gopath_is_a_config_error() {
        let ctx = BuildContext {
            gopath: vec![PathBuf::from("/a:b")],
            ..BuildContext::host()
        };
        let err = GoListResolver::new("/usr/bin/go")
            .command("example.com/x", &ctx)
            .unwrap_err();
        assert!(matches!(err, DeplistError::Config(_)));
    }

    #[test]
    fn missing_binary_is_a_resolve_error() {
        let resolver = GoListResolver::new("/nonexistent/deplist-test/go");
        let err = resolver
            .resolve("example.com/x", &BuildContext::host())
            .unwrap_err();
        assert_eq!(err.package(), Some("example.com/x"));
    }
}
