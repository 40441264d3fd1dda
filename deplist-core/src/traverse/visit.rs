// deplist-core/src/traverse/visit.rs
use std::path::PathBuf;
use std::sync::Arc;

use deplist_common::config::BuildContext;
use deplist_common::error::{DeplistError, Result};
use deplist_common::model::{PackageId, PackageInfo, PackageKind};
use deplist_common::resolver::PackageResolver;
use tracing::{debug, trace, Instrument};

use super::tracker::WorkGuard;
use crate::ledger::Ledger;
use crate::limiter::Limiter;

/// State every visitor in one traversal shares.
pub(super) struct Shared {
    pub ledger: Arc<Ledger>,
    pub limiter: Limiter,
    pub ctx: Arc<BuildContext>,
    pub resolver: Arc<dyn PackageResolver>,
}

/// Spawns a visitor for `id`. `guard` must already be registered.
pub(super) fn spawn_visit(shared: Arc<Shared>, id: PackageId, guard: WorkGuard) {
    let span = tracing::debug_span!("visit", pkg = %id);
    tokio::spawn(
        async move {
            let outcome = visit(&shared, &id, &guard).await;
            if let Err(e) = outcome {
                guard.fail(e);
            }
        }
        .instrument(span),
    );
}

async fn visit(shared: &Arc<Shared>, id: &str, guard: &WorkGuard) -> Result<()> {
    if shared.ledger.claim(id) {
        trace!("[{}] Already claimed, skipping", id);
        return Ok(());
    }

    let pkg = {
        let _permit = shared.limiter.acquire().await?;
        trace!(
            "[{}] Admitted ({} of {} in flight)",
            id,
            shared.limiter.in_flight(),
            shared.limiter.capacity()
        );
        resolve_blocking(shared, id).await?
    };

    let files = collect_files(&pkg);
    let output = artifact_path(id, &pkg, &shared.ctx)?;
    debug!(
        "[{}] Resolved: {} files, {} imports, output {}",
        id,
        files.len(),
        pkg.imports.len(),
        output.display()
    );
    shared.ledger.store(id, files, output)?;

    for import in &pkg.imports {
        let child = guard.register(import.clone());
        spawn_visit(Arc::clone(shared), import.clone(), child);
    }
    Ok(())
}

async fn resolve_blocking(shared: &Shared, id: &str) -> Result<PackageInfo> {
    let resolver = Arc::clone(&shared.resolver);
    let ctx = Arc::clone(&shared.ctx);
    let pkg_id = id.to_string();
    let result = tokio::task::spawn_blocking(move || resolver.resolve(&pkg_id, &ctx))
        .await
        .map_err(|e| DeplistError::Panic(format!("resolver for {id} failed to run: {e}")))?;

    result.map_err(|e| match e {
        DeplistError::Resolve { .. } => e,
        other => DeplistError::resolve(id, other),
    })
}

/// Source files of `pkg` in category order, joined to its source directory.
pub fn collect_files(pkg: &PackageInfo) -> Vec<PathBuf> {
    pkg.sources
        .in_order()
        .into_iter()
        .flatten()
        .map(|name| pkg.dir.join(name))
        .collect()
}

/// Where the build places the compiled form of `id`.
///
/// Programs install to `<root>/bin`, or to `<root>/bin/<goos>_<goarch>` when
/// cross-compiling. Libraries use the path the resolver declared, which must
/// not be empty: a rule without an output is unusable.
pub fn artifact_path(id: &str, pkg: &PackageInfo, ctx: &BuildContext) -> Result<PathBuf> {
    match pkg.kind() {
        PackageKind::Program => {
            let bin = pkg.root.join("bin");
            if ctx.is_cross_compiling() {
                Ok(bin.join(ctx.target.dir_name()).join(id))
            } else {
                Ok(bin.join(id))
            }
        }
        PackageKind::Library if pkg.target.as_os_str().is_empty() => Err(
            DeplistError::resolve(id, "resolver reported no artifact path"),
        ),
        PackageKind::Library => Ok(pkg.target.clone()),
    }
}

#[cfg(test)]
mod tests {
    use deplist_common::config::Platform;
    use deplist_common::model::SourceFiles;

    use super::*;

    fn program(root: &str) -> PackageInfo {
        PackageInfo {
            name: "main".into(),
            root: PathBuf::from(root),
            target: PathBuf::from("/ignored"),
            ..Default::default()
        }
    }

    fn ctx(host: Platform, target: Platform) -> BuildContext {
        BuildContext {
            host,
            ..BuildContext::host()
        }
        .with_target(target)
    }

    #[test]
    fn native_program_installs_to_bin() {
        let linux = Platform::new("linux", "amd64");
        let ctx = ctx(linux.clone(), linux);
        assert_eq!(
            artifact_path("p", &program("/ws"), &ctx).unwrap(),
            PathBuf::from("/ws/bin/p")
        );
    }

    #[test]
    fn cross_program_installs_to_platform_dir() {
        let ctx = ctx(
            Platform::new("darwin", "amd64"),
            Platform::new("linux", "arm64"),
        );
        assert_eq!(
            artifact_path("p", &program("/ws"), &ctx).unwrap(),
            PathBuf::from("/ws/bin/linux_arm64/p")
        );
    }

    #[test]
    fn arch_mismatch_alone_is_cross() {
        let ctx = ctx(
            Platform::new("linux", "amd64"),
            Platform::new("linux", "arm64"),
        );
        assert_eq!(
            artifact_path("cmd/tool", &program("/ws"), &ctx).unwrap(),
            PathBuf::from("/ws/bin/linux_arm64/cmd/tool")
        );
    }

    #[test]
    fn library_uses_declared_target() {
        let pkg = PackageInfo {
            name: "strings".into(),
            root: PathBuf::from("/goroot"),
            target: PathBuf::from("/goroot/pkg/linux_amd64/strings.a"),
            ..Default::default()
        };
        let ctx = ctx(
            Platform::new("darwin", "arm64"),
            Platform::new("linux", "amd64"),
        );
        assert_eq!(
            artifact_path("strings", &pkg, &ctx).unwrap(),
            PathBuf::from("/goroot/pkg/linux_amd64/strings.a")
        );
    }

    #[test]
    fn library_without_target_is_rejected() {
        let pkg = PackageInfo {
            name: "strings".into(),
            root: PathBuf::from("/goroot"),
            ..Default::default()
        };
        let err = artifact_path("strings", &pkg, &BuildContext::host()).unwrap_err();
        assert_eq!(err.package(), Some("strings"));
    }

    #[test]
    fn files_follow_category_order() {
        let pkg = PackageInfo {
            dir: PathBuf::from("/src/x"),
            sources: SourceFiles {
                go_files: vec!["a.go".into(), "b.go".into()],
                cgo_files: vec!["c.go".into()],
                h_files: vec!["d.h".into()],
                c_files: vec!["e.c".into()],
                swig_cxx_files: vec!["f.swigcxx".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let files: Vec<String> = collect_files(&pkg)
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(
            files,
            vec![
                "/src/x/a.go",
                "/src/x/b.go",
                "/src/x/c.go",
                "/src/x/e.c",
                "/src/x/d.h",
                "/src/x/f.swigcxx",
            ]
        );
    }
}
