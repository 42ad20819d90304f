//! Capability runner demo.
//!
//! Assembles a small application out of producers:
//!
//! ```text
//! settings ──────────────┐
//!                        ▼
//! shutdown-main ──▶ ticker (DelayClose) ──▶ audit (Close)
//!      │     ▲            │
//!      │     └── requests shutdown after N ticks
//!      ▼
//! signal-interrupt (Ctrl-C → shutdown)
//! ```
//!
//! `Main` blocks until the ticker or Ctrl-C asks for shutdown; teardown then
//! closes audit, ticker and the signal listener, in that order.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::oneshot;

use capability_runner::config::loader::{load_config, ConfigError};
use capability_runner::config::validation::validate_config;
use capability_runner::observability::logging;
use capability_runner::{
    Assembly, AssemblyConfig, BoxError, Capability, Close, CloseNotifier, Closer, DelayClose,
    Error, Producer, ShutdownMain, ShutdownRequest, SignalInterrupt,
};

#[derive(Parser)]
#[command(name = "capability-runner")]
#[command(about = "Runs a demo application assembled from producers", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `close_timeout_secs` from the configuration
    #[arg(long)]
    close_timeout_secs: Option<u64>,

    /// Ticks before the worker requests shutdown
    #[arg(long, default_value_t = 5)]
    ticks: u64,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,
}

impl Cli {
    /// The configuration file (or defaults) with command-line overrides applied.
    fn settings(&self) -> Result<AssemblyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AssemblyConfig::default(),
        };
        if let Some(secs) = self.close_timeout_secs {
            config.close_timeout_secs = secs;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Tick schedule of the demo worker.
trait Schedule: Send + Sync {
    fn ticks(&self) -> u64;
    fn interval(&self) -> Duration;
}

impl Capability for dyn Schedule {}

/// A background worker whose progress can be inspected.
trait Worker: Send + Sync {
    fn name(&self) -> &str;
    fn completed(&self) -> u64;
}

impl Capability for dyn Worker {}

/// Summary written at teardown.
trait Report: Send + Sync {
    fn total(&self) -> u64;
}

impl Capability for dyn Report {}

struct FixedSchedule {
    ticks: u64,
    interval: Duration,
}

impl Schedule for FixedSchedule {
    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}

struct Ticker {
    completed: Arc<AtomicU64>,
    stop: Mutex<Option<oneshot::Sender<CloseNotifier>>>,
}

impl Ticker {
    fn spawn(schedule: Arc<dyn Schedule>, shutdown: Arc<dyn ShutdownRequest>) -> Result<Arc<Self>, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let completed = Arc::new(AtomicU64::new(0));
        let (stop_tx, mut stop_rx) = oneshot::channel::<CloseNotifier>();

        let counter = completed.clone();
        std::thread::Builder::new()
            .name("ticker".into())
            .spawn(move || {
                let notifier = runtime.block_on(async move {
                    let mut interval = tokio::time::interval(schedule.interval());
                    interval.tick().await;
                    loop {
                        tokio::select! {
                            _ = interval.tick() => {
                                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                                tracing::info!(tick = n, "Tick");
                                if n == schedule.ticks() {
                                    shutdown.shutdown(None);
                                }
                            }
                            stop = &mut stop_rx => break stop.ok(),
                        }
                    }
                });
                tracing::debug!("Ticker stopped");
                if let Some(notifier) = notifier {
                    notifier.notify(Ok(()));
                }
            })?;

        Ok(Arc::new(Self {
            completed,
            stop: Mutex::new(Some(stop_tx)),
        }))
    }
}

impl Worker for Ticker {
    fn name(&self) -> &str {
        "ticker"
    }

    fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

impl DelayClose for Ticker {
    fn close(&self, done: CloseNotifier) {
        let stop = match self.stop.lock() {
            Ok(mut stop) => stop.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match stop {
            Some(stop) => {
                if let Err(done) = stop.send(done) {
                    done.notify(Err("ticker thread exited early".into()));
                }
            }
            None => done.notify(Ok(())),
        }
    }
}

struct Audit {
    workers: Vec<Arc<dyn Worker>>,
}

impl Report for Audit {
    fn total(&self) -> u64 {
        self.workers.iter().map(|w| w.completed()).sum()
    }
}

impl Close for Audit {
    fn close(&self) -> Result<(), BoxError> {
        for worker in &self.workers {
            tracing::info!(worker = worker.name(), ticks = worker.completed(), "Worker summary");
        }
        tracing::info!(total = self.total(), "Audit closed");
        Ok(())
    }
}

fn producers(schedule: FixedSchedule) -> Vec<Producer> {
    vec![
        Producer::value::<dyn Schedule>("settings", Arc::new(schedule)),
        ShutdownMain::producer(),
        SignalInterrupt::producer(),
        Producer::builder("ticker")
            .needs::<dyn Schedule>()
            .needs::<dyn ShutdownRequest>()
            .makes::<dyn Worker>()
            .factory(|deps, out| {
                let ticker = Ticker::spawn(
                    deps.one::<dyn Schedule>()?,
                    deps.one::<dyn ShutdownRequest>()?,
                )?;
                out.provide_closing::<dyn Worker>(ticker.clone(), Closer::delayed(ticker));
                Ok(())
            })
            .build(),
        Producer::builder("audit")
            .needs_all::<dyn Worker>()
            .makes::<dyn Report>()
            .factory(|deps, out| {
                let audit = Arc::new(Audit {
                    workers: deps.all::<dyn Worker>()?,
                });
                out.provide_closing::<dyn Report>(audit.clone(), Closer::immediate(audit));
                Ok(())
            })
            .build(),
    ]
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.settings() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.log_filter);
    tracing::info!(
        close_timeout_secs = config.close_timeout_secs,
        empty_sequence = ?config.empty_sequence,
        ticks = cli.ticks,
        "capability-runner v0.1.0 starting"
    );

    let mut assembly = Assembly::with_config(&config);
    let schedule = FixedSchedule {
        ticks: cli.ticks,
        interval: Duration::from_millis(cli.interval_ms),
    };
    for producer in producers(schedule) {
        if let Err(e) = assembly.add(producer) {
            tracing::error!(error = %e, "Producer rejected");
            return ExitCode::FAILURE;
        }
    }

    let errors = assembly.run();
    if errors.is_empty() {
        tracing::info!("Shutdown complete");
        return ExitCode::SUCCESS;
    }
    for e in &errors {
        tracing::error!(error = %e, "Run failed");
    }
    ExitCode::FAILURE
}
