use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::metrics::Metrics;
use crate::store::{AuditTrail, OrderRepository};
use crate::utils::{retry_on_transient, RetryConfig, RetryResult};

use super::commands::TransitionRequest;
use super::errors::TransitionError;
use super::records::{TransitionOutcome, TransitionRecord};
use super::rules::BusinessRuleGate;
use super::value_objects::OrderSnapshot;

// ============================================================================
// Order Transition Service
// ============================================================================
//
// Orchestrates a single status change:
//
//   load snapshot → self-transition no-op → graph check → rule gate
//     → compare-and-swap write → best-effort audit append
//
// The snapshot is read fresh on every call; the version it carries guards
// the write. A failed audit append is logged and counted but never rolls
// the committed status back.
//
// ============================================================================

pub struct OrderTransitionService {
    repository: Arc<dyn OrderRepository>,
    audit: AuditTrail,
    gate: BusinessRuleGate,
    config: ServiceConfig,
    metrics: Option<Arc<Metrics>>,
}

impl OrderTransitionService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        audit: AuditTrail,
        gate: BusinessRuleGate,
    ) -> Self {
        Self {
            repository,
            audit,
            gate,
            config: ServiceConfig::default(),
            metrics: None,
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Apply one transition request and record the outcome.
    pub async fn update(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, TransitionError> {
        let result = self.apply(request).await;

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(TransitionOutcome::Applied { from, to, .. }) => {
                    metrics.record_transition_applied(from.code(), to.code());
                }
                Ok(TransitionOutcome::NoOp { .. }) => metrics.record_transition_noop(),
                Err(error) => metrics.record_transition_rejected(error.code()),
            }
        }

        result
    }

    /// `update` wrapped in a transient-aware retry loop. Conflicts and
    /// storage failures are retried with backoff; domain rejections are
    /// returned on the first attempt.
    pub async fn update_with_retry(
        &self,
        request: &TransitionRequest,
        retry: RetryConfig,
    ) -> Result<TransitionOutcome, TransitionError> {
        match retry_on_transient(retry, |_attempt| self.update(request)).await {
            RetryResult::Success(outcome) => Ok(outcome),
            RetryResult::Failed(error) | RetryResult::PermanentFailure(error) => Err(error),
        }
    }

    async fn apply(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, TransitionError> {
        let order = self.load(request.order_id).await?;
        let from = order.status;
        let target = request.target_status;

        // Requesting the current status is an idempotent success: nothing
        // is written and no audit record is produced.
        if from == target {
            tracing::debug!(
                order_id = %order.id,
                status = %from,
                "Requested status equals current status, nothing to do"
            );
            return Ok(TransitionOutcome::NoOp { status: from });
        }

        if !from.can_transition_to(target) {
            tracing::warn!(
                order_id = %order.id,
                from = %from,
                to = %target,
                "Rejected status transition: no such edge"
            );
            return Err(TransitionError::InvalidTransition { from, to: target });
        }

        if let Err(violation) = self.gate.check(&order, target) {
            tracing::warn!(
                order_id = %order.id,
                rule = violation.rule,
                to = %target,
                "Business rule rejected status transition"
            );
            return Err(violation.into());
        }

        let new_version = order.version + 1;
        let updated_at = Utc::now();

        let swap = timeout(
            self.config.persist_timeout,
            self.repository.compare_and_swap_status(
                order.id,
                order.version,
                target,
                new_version,
                updated_at,
            ),
        )
        .await;

        let swapped = match swap {
            Ok(result) => result?,
            Err(_) => {
                return Err(TransitionError::Persistence(anyhow!(
                    "status write for order {} timed out after {:?}",
                    order.id,
                    self.config.persist_timeout
                )));
            }
        };

        if !swapped {
            tracing::warn!(
                order_id = %order.id,
                expected_version = order.version,
                "Concurrent modification detected, status not updated"
            );
            return Err(TransitionError::ConcurrencyConflict {
                order_id: order.id,
                expected_version: order.version,
            });
        }

        tracing::info!(
            order_id = %order.id,
            from = %from,
            to = %target,
            new_version = new_version,
            operator = %request.operator,
            "✅ Order status transition applied"
        );

        self.append_audit(TransitionRecord {
            order_id: order.id,
            from_status: from,
            to_status: target,
            operator: request.operator.clone(),
            note: request.note.clone(),
            timestamp: updated_at,
        })
        .await;

        Ok(TransitionOutcome::Applied {
            from,
            to: target,
            new_version,
        })
    }

    async fn load(&self, order_id: Uuid) -> Result<OrderSnapshot, TransitionError> {
        let fetched = timeout(self.config.persist_timeout, self.repository.get(order_id)).await;

        let snapshot = match fetched {
            Ok(result) => result?,
            Err(_) => {
                return Err(TransitionError::Persistence(anyhow!(
                    "load of order {} timed out after {:?}",
                    order_id,
                    self.config.persist_timeout
                )));
            }
        };

        snapshot.ok_or(TransitionError::OrderNotFound(order_id))
    }

    // The status write is already committed when this runs; failures are
    // observable but must not fail the call.
    async fn append_audit(&self, record: TransitionRecord) {
        let order_id = record.order_id;
        match timeout(self.config.audit_timeout, self.audit.record(record)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!(
                    order_id = %order_id,
                    error = %error,
                    "Audit append failed, transition remains committed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_audit_failure();
                }
            }
            Err(_) => {
                tracing::warn!(
                    order_id = %order_id,
                    "Audit append timed out, transition remains committed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_audit_failure();
                }
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::value_objects::{OrderStatus, OrderType, PaymentStatus};
    use crate::store::{AuditSink, InMemoryAuditSink, InMemoryOrderRepository};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::future::pending;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn sales_order(status: OrderStatus, payment: PaymentStatus) -> OrderSnapshot {
        OrderSnapshot {
            id: Uuid::new_v4(),
            order_type: OrderType::Sales,
            status,
            payment_status: payment,
            rental_start_date: None,
            version: 1,
            updated_at: Utc::now(),
        }
    }

    fn rental_order(status: OrderStatus, start_date: Option<NaiveDate>) -> OrderSnapshot {
        OrderSnapshot {
            id: Uuid::new_v4(),
            order_type: OrderType::Rental,
            status,
            payment_status: PaymentStatus::Paid,
            rental_start_date: start_date,
            version: 1,
            updated_at: Utc::now(),
        }
    }

    async fn service_with(
        orders: Vec<OrderSnapshot>,
    ) -> (
        OrderTransitionService,
        Arc<InMemoryOrderRepository>,
        Arc<InMemoryAuditSink>,
    ) {
        let repository = Arc::new(InMemoryOrderRepository::new());
        for order in orders {
            repository.insert(order).await;
        }
        let sink = Arc::new(InMemoryAuditSink::new());
        let service = OrderTransitionService::new(
            repository.clone(),
            AuditTrail::new(sink.clone()),
            BusinessRuleGate::standard(),
        );
        (service, repository, sink)
    }

    #[tokio::test]
    async fn test_valid_transition_is_applied_and_audited() {
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Unpaid);
        let order_id = order.id;
        let (service, repository, sink) = service_with(vec![order]).await;

        let request = TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin")
            .with_note("confirmed by phone");
        let outcome = service.update(&request).await.unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::Applied {
                from: OrderStatus::Pending,
                to: OrderStatus::Confirmed,
                new_version: 2,
            }
        );

        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.version, 2);

        let records = sink.query(order_id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from_status, OrderStatus::Pending);
        assert_eq!(records[0].to_status, OrderStatus::Confirmed);
        assert_eq!(records[0].operator, "admin");
        assert_eq!(records[0].note.as_deref(), Some("confirmed by phone"));
    }

    #[tokio::test]
    async fn test_unknown_order_is_rejected() {
        let (service, _, _) = service_with(vec![]).await;
        let missing = Uuid::new_v4();

        let err = service
            .update(&TransitionRequest::new(missing, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransitionError::OrderNotFound(id) if id == missing));
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_graph_rejects_unknown_edge() {
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        let (service, repository, sink) = service_with(vec![order]).await;

        let err = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Shipped, "admin"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");

        // Nothing written, nothing audited.
        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.version, 1);
        assert!(sink.query(order_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rule_gate_rejects_unpaid_shipping() {
        let order = sales_order(OrderStatus::Processing, PaymentStatus::Unpaid);
        let order_id = order.id;
        let (service, repository, _) = service_with(vec![order]).await;

        let err = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Shipped, "warehouse"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "BUSINESS_RULE_VIOLATION");
        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_rental_cannot_leave_pending_without_start_date() {
        let order = rental_order(OrderStatus::Pending, None);
        let order_id = order.id;
        let (service, _, _) = service_with(vec![order]).await;

        let err = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BUSINESS_RULE_VIOLATION");
    }

    #[tokio::test]
    async fn test_self_transition_is_silent_noop() {
        let order = sales_order(OrderStatus::Completed, PaymentStatus::Paid);
        let order_id = order.id;
        let (service, repository, sink) = service_with(vec![order]).await;

        let outcome = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Completed, "admin"))
            .await
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::NoOp { status: OrderStatus::Completed });

        // No version bump, no audit record.
        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert!(sink.query(order_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_status_cannot_move() {
        let order = sales_order(OrderStatus::Cancelled, PaymentStatus::Refunded);
        let order_id = order.id;
        let (service, _, _) = service_with(vec![order]).await;

        let err = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Pending, "admin"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
    }

    // Repository double that reports a CAS miss for the first N writes,
    // then delegates to a real in-memory store.
    struct ConflictingRepository {
        inner: InMemoryOrderRepository,
        misses_left: AtomicU32,
    }

    impl ConflictingRepository {
        fn new(misses: u32) -> Self {
            Self {
                inner: InMemoryOrderRepository::new(),
                misses_left: AtomicU32::new(misses),
            }
        }
    }

    #[async_trait]
    impl OrderRepository for ConflictingRepository {
        async fn get(&self, order_id: Uuid) -> Result<Option<OrderSnapshot>> {
            self.inner.get(order_id).await
        }

        async fn compare_and_swap_status(
            &self,
            order_id: Uuid,
            expected_version: i64,
            new_status: OrderStatus,
            new_version: i64,
            updated_at: chrono::DateTime<Utc>,
        ) -> Result<bool> {
            if self
                .misses_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Ok(false);
            }
            self.inner
                .compare_and_swap_status(order_id, expected_version, new_status, new_version, updated_at)
                .await
        }
    }

    #[tokio::test]
    async fn test_cas_miss_surfaces_as_concurrency_conflict() {
        let repository = Arc::new(ConflictingRepository::new(u32::MAX));
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        repository.inner.insert(order).await;

        let service = OrderTransitionService::new(
            repository,
            AuditTrail::new(Arc::new(InMemoryAuditSink::new())),
            BusinessRuleGate::standard(),
        );

        let err = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "CONCURRENCY_CONFLICT");
        assert!(matches!(
            err,
            TransitionError::ConcurrencyConflict { order_id: id, expected_version: 1 } if id == order_id
        ));
    }

    // Repository double that holds every reader at a barrier until two callers
    // have loaded the same snapshot, forcing a write-write race on one version.
    struct BarrieredRepository {
        inner: InMemoryOrderRepository,
        barrier: Barrier,
    }

    impl BarrieredRepository {
        fn new() -> Self {
            Self {
                inner: InMemoryOrderRepository::new(),
                barrier: Barrier::new(2),
            }
        }
    }

    #[async_trait]
    impl OrderRepository for BarrieredRepository {
        async fn get(&self, order_id: Uuid) -> Result<Option<OrderSnapshot>> {
            let snapshot = self.inner.get(order_id).await?;
            self.barrier.wait().await;
            Ok(snapshot)
        }

        async fn compare_and_swap_status(
            &self,
            order_id: Uuid,
            expected_version: i64,
            new_status: OrderStatus,
            new_version: i64,
            updated_at: chrono::DateTime<Utc>,
        ) -> Result<bool> {
            self.inner
                .compare_and_swap_status(order_id, expected_version, new_status, new_version, updated_at)
                .await
        }
    }

    #[tokio::test]
    async fn test_concurrent_updates_have_exactly_one_winner() {
        let repository = Arc::new(BarrieredRepository::new());
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        repository.inner.insert(order).await;

        let sink = Arc::new(InMemoryAuditSink::new());
        let service = OrderTransitionService::new(
            repository.clone(),
            AuditTrail::new(sink.clone()),
            BusinessRuleGate::standard(),
        );

        let request = TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin");
        let (first, second) = tokio::join!(service.update(&request), service.update(&request));

        let mut applied = 0;
        let mut conflicts = 0;
        for result in [first, second] {
            match result {
                Ok(TransitionOutcome::Applied { new_version, .. }) => {
                    assert_eq!(new_version, 2);
                    applied += 1;
                }
                Err(TransitionError::ConcurrencyConflict { expected_version, .. }) => {
                    assert_eq!(expected_version, 1);
                    conflicts += 1;
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(conflicts, 1);

        let stored = repository.inner.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.version, 2);
        assert_eq!(sink.count().await, 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_single_conflict() {
        let repository = Arc::new(ConflictingRepository::new(1));
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        repository.inner.insert(order).await;

        let service = OrderTransitionService::new(
            repository.clone(),
            AuditTrail::new(Arc::new(InMemoryAuditSink::new())),
            BusinessRuleGate::standard(),
        );

        let outcome = service
            .update_with_retry(
                &TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"),
                RetryConfig::for_contention(),
            )
            .await
            .unwrap();

        assert!(!outcome.is_noop());
        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_retry_does_not_mask_domain_rejections() {
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        let (service, _, _) = service_with(vec![order]).await;

        let err = service
            .update_with_retry(
                &TransitionRequest::new(order_id, OrderStatus::Delivered, "admin"),
                RetryConfig::for_contention(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
    }

    struct FailingAuditSink;

    #[async_trait]
    impl AuditSink for FailingAuditSink {
        async fn append(&self, _record: TransitionRecord) -> Result<()> {
            anyhow::bail!("audit sink unavailable")
        }

        async fn query(&self, _order_id: Uuid) -> Result<Vec<TransitionRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_undo_transition() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        repository.insert(order).await;

        let metrics = Arc::new(Metrics::new().unwrap());
        let service = OrderTransitionService::new(
            repository.clone(),
            AuditTrail::new(Arc::new(FailingAuditSink)),
            BusinessRuleGate::standard(),
        )
        .with_metrics(metrics.clone());

        let outcome = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap();

        assert!(!outcome.is_noop());
        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(metrics.audit_append_failures.get(), 1);
    }

    // Repository double that never answers; drives the IO timeouts.
    struct UnresponsiveRepository;

    #[async_trait]
    impl OrderRepository for UnresponsiveRepository {
        async fn get(&self, _order_id: Uuid) -> Result<Option<OrderSnapshot>> {
            pending().await
        }

        async fn compare_and_swap_status(
            &self,
            _order_id: Uuid,
            _expected_version: i64,
            _new_status: OrderStatus,
            _new_version: i64,
            _updated_at: chrono::DateTime<Utc>,
        ) -> Result<bool> {
            pending().await
        }
    }

    #[tokio::test]
    async fn test_unresponsive_repository_times_out_as_persistence_error() {
        let service = OrderTransitionService::new(
            Arc::new(UnresponsiveRepository),
            AuditTrail::new(Arc::new(InMemoryAuditSink::new())),
            BusinessRuleGate::standard(),
        )
        .with_config(ServiceConfig {
            persist_timeout: Duration::from_millis(20),
            ..ServiceConfig::default()
        });

        let err = service
            .update(&TransitionRequest::new(
                Uuid::new_v4(),
                OrderStatus::Confirmed,
                "admin",
            ))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PERSISTENCE_ERROR");
    }

    // Repository double whose reads succeed but whose writes never resolve.
    struct StalledWriteRepository {
        inner: InMemoryOrderRepository,
    }

    #[async_trait]
    impl OrderRepository for StalledWriteRepository {
        async fn get(&self, order_id: Uuid) -> Result<Option<OrderSnapshot>> {
            self.inner.get(order_id).await
        }

        async fn compare_and_swap_status(
            &self,
            _order_id: Uuid,
            _expected_version: i64,
            _new_status: OrderStatus,
            _new_version: i64,
            _updated_at: chrono::DateTime<Utc>,
        ) -> Result<bool> {
            pending().await
        }
    }

    #[tokio::test]
    async fn test_stalled_status_write_times_out_as_persistence_error() {
        let repository = Arc::new(StalledWriteRepository {
            inner: InMemoryOrderRepository::new(),
        });
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        repository.inner.insert(order).await;

        let sink = Arc::new(InMemoryAuditSink::new());
        let service = OrderTransitionService::new(
            repository.clone(),
            AuditTrail::new(sink.clone()),
            BusinessRuleGate::standard(),
        )
        .with_config(ServiceConfig {
            persist_timeout: Duration::from_millis(20),
            ..ServiceConfig::default()
        });

        let err = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PERSISTENCE_ERROR");
        // The timed-out write never landed and nothing was audited.
        let stored = repository.inner.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.version, 1);
        assert_eq!(sink.count().await, 0);
    }

    // Sink whose append never resolves; the audit timeout must contain it.
    struct StalledAuditSink;

    #[async_trait]
    impl AuditSink for StalledAuditSink {
        async fn append(&self, _record: TransitionRecord) -> Result<()> {
            pending().await
        }

        async fn query(&self, _order_id: Uuid) -> Result<Vec<TransitionRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_stalled_audit_append_does_not_undo_transition() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        repository.insert(order).await;

        let metrics = Arc::new(Metrics::new().unwrap());
        let service = OrderTransitionService::new(
            repository.clone(),
            AuditTrail::new(Arc::new(StalledAuditSink)),
            BusinessRuleGate::standard(),
        )
        .with_config(ServiceConfig {
            audit_timeout: Duration::from_millis(20),
            ..ServiceConfig::default()
        })
        .with_metrics(metrics.clone());

        let outcome = service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap();

        assert!(!outcome.is_noop());
        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.version, 2);
        assert_eq!(metrics.audit_append_failures.get(), 1);
    }

    #[tokio::test]
    async fn test_metrics_record_each_outcome_kind() {
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        let repository = Arc::new(InMemoryOrderRepository::new());
        repository.insert(order).await;

        let metrics = Arc::new(Metrics::new().unwrap());
        let service = OrderTransitionService::new(
            repository,
            AuditTrail::new(Arc::new(InMemoryAuditSink::new())),
            BusinessRuleGate::standard(),
        )
        .with_metrics(metrics.clone());

        // Applied
        service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap();
        // No-op
        service
            .update(&TransitionRequest::new(order_id, OrderStatus::Confirmed, "admin"))
            .await
            .unwrap();
        // Rejected
        service
            .update(&TransitionRequest::new(order_id, OrderStatus::Delivered, "admin"))
            .await
            .unwrap_err();

        assert_eq!(metrics.transitions_noop.get(), 1);
        assert_eq!(
            metrics
                .transitions_applied
                .with_label_values(&["pending", "confirmed"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .transitions_rejected
                .with_label_values(&["INVALID_STATUS_TRANSITION"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_full_lifecycle_walk() {
        let order = sales_order(OrderStatus::Pending, PaymentStatus::Paid);
        let order_id = order.id;
        let (service, repository, sink) = service_with(vec![order]).await;

        for target in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Completed,
        ] {
            service
                .update(&TransitionRequest::new(order_id, target, "admin"))
                .await
                .unwrap();
        }

        let stored = repository.get(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert_eq!(stored.version, 6); // five applied transitions

        let records = sink.query(order_id).await.unwrap();
        assert_eq!(records.len(), 5);
    }
}
