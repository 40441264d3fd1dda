// deplist/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use deplist_common::config::{parse_tags, BuildContext};
use deplist_common::error::{DeplistError, Result};
use deplist_common::resolver::PackageResolver;
use deplist_core::{write_rules, GoListResolver, IndexResolver, Traversal, DEFAULT_MAX_INFLIGHT};
use tracing::{debug, instrument};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "deplist", bin_name = "deplist")]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Space-separated list of build tags
    #[arg(long, value_name = "TAGS", default_value = "")]
    pub tags: String,

    /// Resolve packages from a JSON package index instead of `go list`
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Maximum number of package resolutions running at once
    #[arg(
        long,
        value_name = "N",
        env = "DEPLIST_MAX_INFLIGHT",
        default_value_t = DEFAULT_MAX_INFLIGHT,
        value_parser = parse_max_inflight
    )]
    pub max_inflight: usize,

    #[arg(required = true, value_name = "PACKAGES")]
    pub packages: Vec<String>,
}

fn parse_max_inflight(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl CliArgs {
    pub fn build_context(&self) -> BuildContext {
        BuildContext::from_env(parse_tags(&self.tags))
    }

    fn resolver(&self) -> Result<Arc<dyn PackageResolver>> {
        match &self.index {
            Some(path) => Ok(Arc::new(IndexResolver::load(path)?)),
            None => Ok(Arc::new(GoListResolver::locate()?)),
        }
    }

    /// Discovers the closure of the requested packages and prints one rule
    /// per package. Nothing is printed unless every package resolved.
    #[instrument(skip(self), fields(packages = ?self.packages))]
    pub async fn run(&self) -> Result<()> {
        let ctx = self.build_context();
        let resolver = self.resolver()?;

        let snapshot = Traversal::new(ctx, resolver)
            .with_max_inflight(self.max_inflight)
            .run(&self.packages)
            .await?;
        debug!("Writing {} rules", snapshot.len());

        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_rules(&snapshot, &mut out).map_err(DeplistError::from)?;
        out.flush().map_err(DeplistError::from)
    }
}
