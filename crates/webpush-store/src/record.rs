use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use webpush::Subscription;

/// A stored subscription plus bookkeeping.
///
/// `vapid_key` is the base64url application server key the browser
/// subscribed with. After a key rotation, records that still carry the old
/// key keep that key alive until they are deleted or re-subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub subscription: Subscription,
    /// Set by the store on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the store on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vapid_key: Option<String>,
}

impl SubscriptionRecord {
    pub fn new(id: impl Into<String>, subscription: Subscription) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            subscription,
            created_at: None,
            updated_at: None,
            vapid_key: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_vapid_key(mut self, vapid_key: impl Into<String>) -> Self {
        self.vapid_key = Some(vapid_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        self.subscription.endpoint()
    }
}
