use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::{Arc, OnceLock};
use tracing::info;

static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Initializes on first use and returns the process-wide `Metrics`.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}

pub const RESULT_OK: &str = "ok";
pub const RESULT_NOT_FOUND: &str = "not_found";
pub const RESULT_UNAVAILABLE: &str = "unavailable";
pub const RESULT_READ_FAILURE: &str = "read_failure";
pub const RESULT_CONFIG_FAILURE: &str = "config_failure";
pub const RESULT_STORE_FAILURE: &str = "store_failure";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Store metrics
    pub cached_tokens: IntGauge,
    pub token_requests: IntCounterVec,

    // Reconcile metrics
    pub reconcile_runs: IntCounterVec,
    pub reconcile_duration: Histogram,
    pub last_successful_reconcile_unix: IntGauge,
    pub token_file_read_failures: IntCounterVec,

    // Config/runtime
    pub config_load_failures: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenmachine".into()), None)
            .expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Store
            cached_tokens: IntGauge::new("cached_tokens", "Tokens currently held by the store").expect("metric"),
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token lookups by result"), &["result"]).expect("metric"),

            // Reconcile
            reconcile_runs: IntCounterVec::new(Opts::new("reconcile_runs_total", "Reconciliation passes by result"), &["result"]).expect("metric"),
            reconcile_duration: Histogram::with_opts(HistogramOpts::new("reconcile_duration_seconds", "Reconciliation pass duration seconds").buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])).expect("metric"),
            last_successful_reconcile_unix: IntGauge::new("last_successful_reconcile_unix_seconds", "Time of the last successful reconciliation").expect("metric"),
            token_file_read_failures: IntCounterVec::new(Opts::new("token_file_read_failures_total", "Token file read failures"), &["token"]).expect("metric"),

            // Config/runtime
            config_load_failures: IntCounter::new("config_load_failures_total", "Config load or validation failures").expect("metric"),
            up: IntGauge::new("up", "1 if the token store is running").expect("metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.cached_tokens.clone()),
            Box::new(metrics.token_requests.clone()),
            Box::new(metrics.reconcile_runs.clone()),
            Box::new(metrics.reconcile_duration.clone()),
            Box::new(metrics.last_successful_reconcile_unix.clone()),
            Box::new(metrics.token_file_read_failures.clone()),
            Box::new(metrics.config_load_failures.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("unique metric name");
        }

        metrics
    }
}
