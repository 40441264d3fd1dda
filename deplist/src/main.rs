// deplist/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use deplist_core::DEFAULT_MAX_INFLIGHT;
use tracing::level_filters::LevelFilter;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn init_logging(verbose_level: u8) {
    let level_filter = match verbose_level {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("DEPLIST_LOG")
        .from_env_lossy();

    // stdout carries the rules, so logs go to stderr only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
}

fn main() {
    let cli_args = CliArgs::parse();
    init_logging(cli_args.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get().max(2))
        .max_blocking_threads(cli_args.max_inflight.max(DEFAULT_MAX_INFLIGHT))
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: failed to start runtime: {}", "Error".red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(cli_args.run()) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        // Exit without waiting on visitors that are still resolving.
        process::exit(1);
    }

    debug!("Command completed successfully.");
}
