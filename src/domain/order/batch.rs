use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::metrics::Metrics;

use super::commands::BatchRequest;
use super::errors::{BatchError, TransitionError, BATCH_CANCELLED};
use super::records::{BatchFailure, BatchResult, TransitionOutcome};
use super::service::OrderTransitionService;

// ============================================================================
// Batch Transition Engine
// ============================================================================
//
// Runs one transition per input id with bounded concurrency and aggregates
// the outcomes. Items are isolated: a failure is recorded and the rest of
// the batch continues; already-applied transitions are never rolled back.
//
// Workers report `(input index, outcome)` pairs that are merged after the
// last worker finishes, so the result lists follow input order without any
// shared mutable state. Cancellation stops SCHEDULING new items; items
// already in flight run to completion and unscheduled ids are reported as
// failures so every input id stays accounted for.
//
// ============================================================================

pub struct BatchTransitionEngine {
    service: Arc<OrderTransitionService>,
    config: BatchConfig,
    metrics: Option<Arc<Metrics>>,
}

enum ItemOutcome {
    Done(Result<TransitionOutcome, TransitionError>),
    /// Cancelled before the item was scheduled.
    Skipped,
}

impl BatchTransitionEngine {
    pub fn new(service: Arc<OrderTransitionService>) -> Self {
        Self {
            service,
            config: BatchConfig::default(),
            metrics: None,
        }
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Transition every order in the request, collecting per-item outcomes.
    pub async fn batch_update(&self, request: &BatchRequest) -> Result<BatchResult, BatchError> {
        self.batch_update_with_cancellation(request, CancellationToken::new())
            .await
    }

    pub async fn batch_update_with_cancellation(
        &self,
        request: &BatchRequest,
        cancel: CancellationToken,
    ) -> Result<BatchResult, BatchError> {
        if let Err(error) = self.validate(request) {
            tracing::warn!(
                total = request.order_ids.len(),
                code = error.code(),
                "Rejected batch request"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_batch_run("rejected");
            }
            return Err(error);
        }

        let started = Instant::now();
        let concurrency = self.config.concurrency.max(1);

        tracing::info!(
            total = request.order_ids.len(),
            target = %request.target_status,
            concurrency = concurrency,
            "Starting batch status update"
        );

        let mut outcomes: Vec<(usize, Uuid, ItemOutcome)> =
            stream::iter(request.order_ids.iter().copied().enumerate())
                .map(|(index, order_id)| {
                    let service = Arc::clone(&self.service);
                    let cancel = cancel.clone();
                    let item = request.item(order_id);
                    async move {
                        if cancel.is_cancelled() {
                            return (index, order_id, ItemOutcome::Skipped);
                        }
                        let result = service.update(&item).await;
                        (index, order_id, ItemOutcome::Done(result))
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        // Workers finish in arbitrary order; restore input order before
        // building the result.
        outcomes.sort_by_key(|(index, ..)| *index);

        let mut result = BatchResult {
            total_count: request.order_ids.len(),
            success_ids: Vec::new(),
            failures: Vec::new(),
        };

        for (_, order_id, outcome) in outcomes {
            match outcome {
                ItemOutcome::Done(Ok(_)) => {
                    self.record_item("success");
                    result.success_ids.push(order_id);
                }
                ItemOutcome::Done(Err(error)) => {
                    self.record_item("failure");
                    result.failures.push(BatchFailure {
                        order_id,
                        code: error.code(),
                        reason: error.to_string(),
                    });
                }
                ItemOutcome::Skipped => {
                    self.record_item("cancelled");
                    result.failures.push(BatchFailure {
                        order_id,
                        code: BATCH_CANCELLED,
                        reason: "batch cancelled before this order was processed".to_string(),
                    });
                }
            }
        }

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_batch_run("ok");
            metrics.record_batch_duration(elapsed.as_secs_f64());
        }

        tracing::info!(
            total = result.total_count,
            succeeded = result.success_count(),
            failed = result.failure_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "✅ Batch status update finished"
        );

        Ok(result)
    }

    fn validate(&self, request: &BatchRequest) -> Result<(), BatchError> {
        if request.order_ids.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        if request.order_ids.len() > self.config.max_batch_size {
            return Err(BatchError::SizeExceeded {
                actual: request.order_ids.len(),
                limit: self.config.max_batch_size,
            });
        }
        Ok(())
    }

    fn record_item(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_batch_item(result);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
