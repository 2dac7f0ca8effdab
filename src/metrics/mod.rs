use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Single transitions (applied, rejected, no-op)
// - Audit append failures
// - Batch runs (outcome, per-item results, duration)
//
// The crate exposes the registry; the embedding service owns scraping.
// ============================================================================

/// Central metrics registry for the transition engine
pub struct Metrics {
    registry: Registry,

    // Single Transition Metrics
    pub transitions_applied: IntCounterVec,
    pub transitions_rejected: IntCounterVec,
    pub transitions_noop: IntCounter,

    // Audit Metrics
    pub audit_append_failures: IntCounter,

    // Batch Metrics
    pub batch_runs: IntCounterVec,
    pub batch_items: IntCounterVec,
    pub batch_duration: Histogram,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Single Transition Metrics
        let transitions_applied = IntCounterVec::new(
            Opts::new("order_transitions_applied_total", "Status transitions applied"),
            &["from", "to"],
        )?;
        registry.register(Box::new(transitions_applied.clone()))?;

        let transitions_rejected = IntCounterVec::new(
            Opts::new("order_transitions_rejected_total", "Status transitions rejected"),
            &["code"],
        )?;
        registry.register(Box::new(transitions_rejected.clone()))?;

        let transitions_noop = IntCounter::new(
            "order_transitions_noop_total",
            "Requests whose target equaled the current status",
        )?;
        registry.register(Box::new(transitions_noop.clone()))?;

        // Audit Metrics
        let audit_append_failures = IntCounter::new(
            "order_audit_append_failures_total",
            "Audit records that could not be appended",
        )?;
        registry.register(Box::new(audit_append_failures.clone()))?;

        // Batch Metrics
        let batch_runs = IntCounterVec::new(
            Opts::new("order_batch_runs_total", "Batch transition runs"),
            &["outcome"],
        )?;
        registry.register(Box::new(batch_runs.clone()))?;

        let batch_items = IntCounterVec::new(
            Opts::new("order_batch_items_total", "Batch items by per-item result"),
            &["result"],
        )?;
        registry.register(Box::new(batch_items.clone()))?;

        let batch_duration = Histogram::with_opts(
            HistogramOpts::new("order_batch_duration_seconds", "Batch run duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
        )?;
        registry.register(Box::new(batch_duration.clone()))?;

        Ok(Self {
            registry,
            transitions_applied,
            transitions_rejected,
            transitions_noop,
            audit_append_failures,
            batch_runs,
            batch_items,
            batch_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record an applied transition
    pub fn record_transition_applied(&self, from: &str, to: &str) {
        self.transitions_applied.with_label_values(&[from, to]).inc();
    }

    /// Helper to record a rejected transition by error code
    pub fn record_transition_rejected(&self, code: &str) {
        self.transitions_rejected.with_label_values(&[code]).inc();
    }

    /// Helper to record a self-transition no-op
    pub fn record_transition_noop(&self) {
        self.transitions_noop.inc();
    }

    /// Helper to record a failed audit append
    pub fn record_audit_failure(&self) {
        self.audit_append_failures.inc();
    }

    /// Helper to record a finished or rejected batch run
    pub fn record_batch_run(&self, outcome: &str) {
        self.batch_runs.with_label_values(&[outcome]).inc();
    }

    /// Helper to record how long a completed batch run took
    pub fn record_batch_duration(&self, duration_secs: f64) {
        self.batch_duration.observe(duration_secs);
    }

    /// Helper to record one batch item result
    pub fn record_batch_item(&self, result: &str) {
        self.batch_items.with_label_values(&[result]).inc();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
