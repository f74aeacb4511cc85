//! extfilter-exporter - Prometheus exporter for extfilter statistics.
//!
//! Serves the counters extfilter writes to its stats file in the
//! Prometheus text format. The file is re-read on every scrape.

mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use extfilter_core::collector::{FileSystem, RealFs, StatsCollector};
use extfilter_core::exposition::{ExtfilterCollector, registry_for};

use state::{ExporterState, SharedState};

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "extfilter-exporter",
    about = "Prometheus exporter for extfilter statistics",
    version = extfilter_core::VERSION
)]
struct Args {
    /// Address on which to expose metrics and web interface.
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9513", env = "EXTFILTER_LISTEN")]
    listen_address: String,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", default_value = "/metrics", env = "EXTFILTER_TELEMETRY_PATH")]
    telemetry_path: String,

    /// ExtFilter stats file.
    #[arg(long = "extfilter.stats-path", env = "EXTFILTER_STATS_PATH")]
    stats_path: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Checks flag combinations clap cannot express.
fn validate_args(args: &Args) -> Result<(), String> {
    if args.stats_path.as_os_str().is_empty() {
        return Err("extfilter stats file is not provided".to_string());
    }
    if !args.telemetry_path.starts_with('/') {
        return Err(format!(
            "telemetry path must start with '/': {}",
            args.telemetry_path
        ));
    }
    // axum treats `:name`, `*name` and `{name}` segments as captures.
    let has_capture = args.telemetry_path.split('/').any(|segment| {
        segment.starts_with(':') || segment.starts_with('*') || segment.contains(['{', '}'])
    });
    if has_capture {
        return Err(format!(
            "telemetry path must not contain route parameters: {}",
            args.telemetry_path
        ));
    }
    if handlers::RESERVED_PATHS.contains(&args.telemetry_path.as_str()) {
        return Err(format!(
            "telemetry path {} is reserved",
            args.telemetry_path
        ));
    }
    Ok(())
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["extfilter_exporter", "extfilter_core", "tower_http"] {
        if let Ok(directive) = format!("{target}={level}").parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    if let Err(msg) = validate_args(&args) {
        error!("{}", msg);
        process::exit(1);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(msg) = runtime.block_on(async_main(args)) {
        error!("{}", msg);
        process::exit(1);
    }
}

async fn async_main(args: Args) -> Result<(), String> {
    info!(
        version = extfilter_core::VERSION,
        stats_path = %args.stats_path.display(),
        "starting extfilter exporter"
    );

    let fs = RealFs::new();
    if !fs.exists(&args.stats_path) {
        warn!(
            path = %args.stats_path.display(),
            "stats file does not exist yet, scrapes will be empty until extfilter writes it"
        );
    }

    let collector = ExtfilterCollector::new(StatsCollector::new(fs, &args.stats_path))
        .map_err(|e| format!("failed to create collector: {e}"))?;
    let registry =
        registry_for(collector).map_err(|e| format!("failed to register collector: {e}"))?;

    let state: SharedState = Arc::new(ExporterState {
        registry,
        telemetry_path: args.telemetry_path.clone(),
    });

    let app = handlers::app(state).into_make_service_with_connect_info::<SocketAddr>();

    let addr: SocketAddr = args
        .listen_address
        .parse()
        .map_err(|e| format!("invalid listen address {}: {e}", args.listen_address))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("unable to start extfilter exporter on {addr}: {e}"))?;

    info!(%addr, path = %args.telemetry_path, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
