//! Shared runtime, logging and utilities for the AFS to EOS migration tools
//!
//! Every tool binary follows the same shape: parse arguments with `clap`, build the config
//! structs from [`config`], then hand an async closure to [`run`] which sets up logging,
//! builds the runtime, reports errors and optionally prints a summary.

pub mod chunk;
pub mod config;
pub mod credential;
pub mod dirlist;
pub mod interrupt;
pub mod preflight;

pub use chunk::chunkify;
pub use config::OutputConfig;
pub use config::Timing;
pub use credential::CredentialFile;
pub use interrupt::{Interrupt, Interrupted, until_interrupted};

fn get_env_filter(output: &OutputConfig) -> tracing_subscriber::EnvFilter {
    // RUST_LOG wins over -v so individual targets can be tuned
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(output.log_level()))
}

fn init_tracing(output: &OutputConfig) {
    let res = tracing_subscriber::fmt()
        .with_env_filter(get_env_filter(output))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(error) = res {
        // only happens if a subscriber was already installed, e.g. by a test harness
        eprintln!("tracing subscriber already initialized: {error}");
    }
}

/// Run `func` to completion on a single-threaded runtime
///
/// Blocking tasks still running once `func` finishes are abandoned.
///
/// Returns `None` if the runtime could not be created or `func` failed; the error has
/// already been reported (unless quiet mode is on) and callers are expected to exit with a
/// non-zero status.
pub fn run<Summary, Error, Fut>(
    output: OutputConfig,
    func: impl FnOnce() -> Fut,
) -> Option<Summary>
where
    Summary: std::fmt::Display,
    Error: std::fmt::Display,
    Fut: std::future::Future<Output = Result<Summary, Error>>,
{
    init_tracing(&output);
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            if !output.quiet {
                tracing::error!("failed to start runtime: {}", error);
            }
            return None;
        }
    };
    let res = runtime.block_on(func());
    // an interrupted run may leave a blocking stdin read behind, don't wait for it
    runtime.shutdown_background();
    match res {
        Ok(summary) => {
            if output.print_summary || output.verbose > 0 {
                println!("{summary}");
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                tracing::error!("{:#}", error);
            }
            None
        }
    }
}
