use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{OrderSnapshot, OrderStatus, TransitionRecord};

use super::audit::AuditSink;
use super::repository::OrderRepository;

// ============================================================================
// In-Memory Store Implementations
// ============================================================================
//
// Reference implementations used by the crate's tests and by embedders that
// want the engine without a database. Both are safe to share behind an Arc.
//
// ============================================================================

pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, OrderSnapshot>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a snapshot. Test seeding helper.
    pub async fn insert(&self, snapshot: OrderSnapshot) {
        self.orders.write().await.insert(snapshot.id, snapshot);
    }

    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get(&self, order_id: Uuid) -> Result<Option<OrderSnapshot>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn compare_and_swap_status(
        &self,
        order_id: Uuid,
        expected_version: i64,
        new_status: OrderStatus,
        new_version: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order_id) {
            Some(row) if row.version == expected_version => {
                row.status = new_status;
                row.version = new_version;
                row.updated_at = updated_at;
                Ok(true)
            }
            // Stale version or row deleted since the read: report a miss,
            // the caller decides what that means.
            _ => Ok(false),
        }
    }
}

pub struct InMemoryAuditSink {
    records: RwLock<Vec<TransitionRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, record: TransitionRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn query(&self, order_id: Uuid) -> Result<Vec<TransitionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
