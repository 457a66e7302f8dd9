//! Core application runner for `ble-thermo-exporter`.
//!
//! This module is intentionally decoupled from CLI parsing, signal handling and
//! process exit codes so it can be tested deterministically with an injected
//! scanner and shutdown future.

use crate::collector::Collector;
use crate::http;
use crate::metrics::{MetricsSink, PrometheusSink};
use crate::scanner::{Advertisement, ScanError};
use clap::Parser;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Configuration for the exporter.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Address the metrics HTTP server listens on.
    #[arg(long, default_value = "0.0.0.0:9000")]
    pub listen: SocketAddr,

    /// HTTP path serving the metrics snapshot.
    #[arg(long, default_value = http::DEFAULT_METRICS_PATH, value_parser = http::parse_metrics_path)]
    pub metrics_path: String,

    /// Verbose output, log rejected advertisements
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Scanner abstraction to enable deterministic unit tests without Bluetooth hardware.
pub trait Scanner: Send + Sync {
    fn start_scan(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>;
}

/// Real scanner implementation backed by BlueZ.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealScanner;

impl Scanner for RealScanner {
    fn start_scan(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>
    {
        Box::pin(crate::scanner::start_scan())
    }
}

/// Start the scanner and feed every advertisement to `collector`.
///
/// Returns `Ok` once the scanner closes its channel, or the error that kept
/// the scan from starting.
pub async fn collect<S: MetricsSink>(
    scanner: &dyn Scanner,
    collector: &Collector<S>,
) -> Result<(), ScanError> {
    let mut advertisements = scanner.start_scan().await?;

    while let Some(advertisement) = advertisements.recv().await {
        collector.handle_advertisement(&advertisement);
    }

    Ok(())
}

/// Run the exporter until `shutdown` resolves.
///
/// - Binds the metrics HTTP server on `options.listen` and serves a fresh [`PrometheusSink`].
/// - Scans with `scanner`; a scan that fails to start is fatal and returned as an error.
/// - A scan that ends later is logged, and metrics stay available until shutdown.
pub async fn run(
    options: Options,
    scanner: &dyn Scanner,
    shutdown: impl Future<Output = ()>,
) -> Result<(), RunError> {
    let sink = PrometheusSink::new()?;
    let listener = TcpListener::bind(options.listen).await?;
    let router = http::router(sink.clone(), &options.metrics_path);
    let collector = Collector::new(sink);

    let scan = async {
        collect(scanner, &collector).await?;
        log::error!("Scanner stopped delivering advertisements; serving last known values");
        std::future::pending::<()>().await;
        Ok::<(), RunError>(())
    };

    tokio::select! {
        result = http::serve(listener, router) => result?,
        result = scan => result?,
        _ = shutdown => log::info!("Stopping scan..."),
    }

    Ok(())
}
