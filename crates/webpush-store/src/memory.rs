//! In-process subscription store for tests and single-node deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use webpush_keys::{BoxError, UsageOracle};

use crate::error::{Result, StoreError};
use crate::record::SubscriptionRecord;
use crate::store::SubscriptionStore;

#[derive(Default)]
struct Tables {
    /// id → record
    records: HashMap<String, SubscriptionRecord>,
    /// endpoint → id
    endpoints: HashMap<String, String>,
}

impl Tables {
    fn remove(&mut self, id: &str) -> Option<SubscriptionRecord> {
        let record = self.records.remove(id)?;
        self.endpoints.remove(record.endpoint());
        Some(record)
    }

    /// Matching records, oldest first, ties broken by id.
    fn sorted(&self, filter: impl Fn(&SubscriptionRecord) -> bool) -> Vec<&SubscriptionRecord> {
        let mut matched: Vec<_> = self.records.values().filter(|r| filter(r)).collect();
        matched.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        matched
    }
}

/// `HashMap`-backed [`SubscriptionStore`].
///
/// One endpoint maps to at most one record: saving a record whose endpoint
/// already belongs to another id replaces that other record.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count(&self, vapid_key: &str) -> usize {
        self.tables
            .read()
            .records
            .values()
            .filter(|r| r.vapid_key.as_deref() == Some(vapid_key))
            .count()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.len())
            .finish()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn save(&self, mut record: SubscriptionRecord) -> Result<SubscriptionRecord> {
        if record.id.is_empty() {
            return Err(StoreError::InvalidRecord("id must not be empty".into()));
        }
        let now = Utc::now();
        let mut tables = self.tables.write();

        let previous = tables.remove(&record.id);
        record.created_at = previous
            .and_then(|p| p.created_at)
            .or(record.created_at)
            .or(Some(now));
        record.updated_at = Some(now);

        if let Some(other) = tables.endpoints.get(record.endpoint()).cloned() {
            debug!(replaced = %other, id = %record.id, "endpoint re-registered");
            tables.remove(&other);
        }

        tables
            .endpoints
            .insert(record.endpoint().to_string(), record.id.clone());
        tables.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<SubscriptionRecord> {
        self.tables
            .read()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn get_by_endpoint(&self, endpoint: &str) -> Result<SubscriptionRecord> {
        let tables = self.tables.read();
        tables
            .endpoints
            .get(endpoint)
            .and_then(|id| tables.records.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(endpoint.to_string()))
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<SubscriptionRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .sorted(|r| r.user_id.as_deref() == Some(user_id))
            .into_iter()
            .cloned()
            .collect())
    }

    async fn get_by_vapid_key(&self, vapid_key: &str) -> Result<Vec<SubscriptionRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .sorted(|r| r.vapid_key.as_deref() == Some(vapid_key))
            .into_iter()
            .cloned()
            .collect())
    }

    async fn count_by_vapid_key(&self, vapid_key: &str) -> Result<usize> {
        Ok(self.count(vapid_key))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.tables.write().remove(id);
        Ok(())
    }

    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<()> {
        let mut tables = self.tables.write();
        if let Some(id) = tables.endpoints.get(endpoint).cloned() {
            tables.remove(&id);
        }
        Ok(())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<SubscriptionRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .sorted(|_| true)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UsageOracle for MemoryStore {
    async fn count_by_key(&self, public_key: &str) -> std::result::Result<usize, BoxError> {
        Ok(self.count(public_key))
    }
}
