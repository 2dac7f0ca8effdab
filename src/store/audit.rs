use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::TransitionRecord;

// ============================================================================
// Audit Trail - Append-Only Transition History
// ============================================================================
//
// Audit writes are best-effort: the service commits the status change first
// and a failed append must never undo it. The sink trait therefore has no
// transactional coupling to the repository.
//
// ============================================================================

#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record. Records are immutable once written.
    async fn append(&self, record: TransitionRecord) -> Result<()>;

    /// All records for an order, in whatever order the sink keeps them.
    async fn query(&self, order_id: Uuid) -> Result<Vec<TransitionRecord>>;
}

/// Facade over an injected sink. Construction takes the sink explicitly so
/// tests and embedders choose the backing store.
pub struct AuditTrail {
    sink: Arc<dyn AuditSink>,
}

impl AuditTrail {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, record: TransitionRecord) -> Result<()> {
        tracing::debug!(
            order_id = %record.order_id,
            from = %record.from_status,
            to = %record.to_status,
            operator = %record.operator,
            "Appending transition record"
        );
        self.sink.append(record).await
    }

    /// Full history for an order, oldest first regardless of sink order.
    pub async fn history(&self, order_id: Uuid) -> Result<Vec<TransitionRecord>> {
        let mut records = self.sink.query(order_id).await?;
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
