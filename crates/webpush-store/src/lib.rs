//! Subscription storage for Web Push senders.
//!
//! Records remember which VAPID key a browser subscribed with, so a store can
//! act as the [`UsageOracle`](webpush_keys::UsageOracle) that decides which
//! rotated-out keys are safe to drop.

mod error;
mod memory;
mod record;
mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use record::SubscriptionRecord;
pub use store::{StoreUsage, SubscriptionStore};
