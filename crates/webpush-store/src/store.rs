use std::sync::Arc;

use async_trait::async_trait;
use webpush_keys::{BoxError, UsageOracle};

use crate::error::Result;
use crate::record::SubscriptionRecord;

/// Persistence for push subscriptions.
///
/// Records are returned by value. Mutating a returned record has no effect
/// until it is saved again.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or replace by id and return the stored copy.
    ///
    /// `created_at` is kept from the existing record (or set now on first
    /// save); `updated_at` is always set now.
    async fn save(&self, record: SubscriptionRecord) -> Result<SubscriptionRecord>;

    async fn get(&self, id: &str) -> Result<SubscriptionRecord>;

    async fn get_by_endpoint(&self, endpoint: &str) -> Result<SubscriptionRecord>;

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<SubscriptionRecord>>;

    /// Every record created against `vapid_key` (base64url public key).
    async fn get_by_vapid_key(&self, vapid_key: &str) -> Result<Vec<SubscriptionRecord>>;

    async fn count_by_vapid_key(&self, vapid_key: &str) -> Result<usize>;

    /// Absent ids are not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<()>;

    /// Page through all records, oldest first (ties broken by id).
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<SubscriptionRecord>>;
}

#[async_trait]
impl<S: SubscriptionStore + ?Sized> SubscriptionStore for Arc<S> {
    async fn save(&self, record: SubscriptionRecord) -> Result<SubscriptionRecord> {
        (**self).save(record).await
    }

    async fn get(&self, id: &str) -> Result<SubscriptionRecord> {
        (**self).get(id).await
    }

    async fn get_by_endpoint(&self, endpoint: &str) -> Result<SubscriptionRecord> {
        (**self).get_by_endpoint(endpoint).await
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<SubscriptionRecord>> {
        (**self).get_by_user_id(user_id).await
    }

    async fn get_by_vapid_key(&self, vapid_key: &str) -> Result<Vec<SubscriptionRecord>> {
        (**self).get_by_vapid_key(vapid_key).await
    }

    async fn count_by_vapid_key(&self, vapid_key: &str) -> Result<usize> {
        (**self).count_by_vapid_key(vapid_key).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id).await
    }

    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<()> {
        (**self).delete_by_endpoint(endpoint).await
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<SubscriptionRecord>> {
        (**self).list(limit, offset).await
    }
}

/// Answers key-usage queries for [`RotatingSigner::remove_unused_keys`]
/// from any store.
///
/// [`RotatingSigner::remove_unused_keys`]: webpush_keys::RotatingSigner::remove_unused_keys
#[derive(Debug, Clone)]
pub struct StoreUsage<S>(pub S);

#[async_trait]
impl<S: SubscriptionStore> UsageOracle for StoreUsage<S> {
    async fn count_by_key(&self, public_key: &str) -> std::result::Result<usize, BoxError> {
        Ok(self.0.count_by_vapid_key(public_key).await?)
    }
}
