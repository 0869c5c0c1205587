use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payroute::application::cleanup::CleanupTask;
use payroute::application::health::HealthEvaluator;
use payroute::application::monitoring::GatewayStatus;
use payroute::application::router::PaymentRouter;
use payroute::application::selector::{GatewaySelector, RandomSource, SeededRandom, ThreadRandom};
use payroute::application::transactions::TransactionService;
use payroute::config::RoutingConfig;
use payroute::domain::clock::{Clock, SystemClock};
use payroute::domain::ports::{HealthWindowStoreBox, PaymentGatewayBox, TransactionStoreBox};
use payroute::infrastructure::in_memory::{InMemoryHealthStore, InMemoryTransactionStore};
use payroute::infrastructure::simulated::SimulatedGateway;
use payroute::interfaces::csv::event_reader::{Event, EventReader};
use payroute::interfaces::csv::report_writer::HealthReportWriter;
use payroute::logging::init_logging;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Routing events CSV file
    input: PathBuf,

    /// Gateway and health configuration (TOML). Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Seed for gateway selection and the simulated gateways.
    #[arg(long)]
    seed: Option<u64>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(HealthWindowStoreBox, TransactionStoreBox)> {
    use payroute::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        let health_store: HealthWindowStoreBox = Box::new(store.clone());
        let transaction_store: TransactionStoreBox = Box::new(store);
        return Ok((health_store, transaction_store));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(HealthWindowStoreBox, TransactionStoreBox)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (HealthWindowStoreBox, TransactionStoreBox) {
    let health_store: HealthWindowStoreBox = Box::new(InMemoryHealthStore::new());
    let transaction_store: TransactionStoreBox = Box::new(InMemoryTransactionStore::new());
    (health_store, transaction_store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RoutingConfig::from_file(path).into_diagnostic()?,
        None => RoutingConfig::default(),
    };
    init_logging(&config.logging).into_diagnostic()?;

    let (health_store, transaction_store) = open_stores(cli.db_path)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let evaluator = Arc::new(HealthEvaluator::new(
        health_store,
        config.health.clone(),
        clock.clone(),
    ));

    let random: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };
    let gateway: PaymentGatewayBox = match cli.seed {
        Some(seed) => Box::new(SimulatedGateway::with_seed(config.simulation.clone(), seed)),
        None => Box::new(SimulatedGateway::new(config.simulation.clone())),
    };
    let selector = Arc::new(GatewaySelector::with_random(
        config.gateways.clone(),
        evaluator.clone(),
        random,
    ));

    let mut router = PaymentRouter::new(selector.clone(), evaluator.clone(), gateway);
    if let Some(timeout_ms) = config.attempt_timeout_ms {
        router = router.with_attempt_timeout(Duration::from_millis(timeout_ms));
    }
    let service = TransactionService::new(router, transaction_store, clock);

    let cleanup = CleanupTask::spawn(evaluator.clone(), config.health.cleanup_interval());

    // Process events
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = EventReader::new(file);
    for event in reader.events() {
        let result = match event {
            Ok(Event::Initiate(request)) => service.initiate(request).await.map(|_| ()),
            Ok(Event::Callback(callback)) => service.handle_callback(callback).await.map(|_| ()),
            Err(e) => {
                eprintln!("Error reading event: {}", e);
                continue;
            }
        };
        if let Err(e) = result {
            eprintln!("Error processing event: {}", e);
        }
    }

    cleanup.shutdown().await;

    // Output final gateway health
    let statuses = GatewayStatus::collect_all(&selector).await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = HealthReportWriter::new(stdout.lock());
    writer.write_statuses(statuses).into_diagnostic()?;

    Ok(())
}
