use std::sync::Arc;

use webpush::{FileSigner, RotatingSigner, Subscription};
use webpush_store::{MemoryStore, StoreUsage, SubscriptionRecord, SubscriptionStore};

const P256DH: &str =
    "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM";
const AUTH: &str = "tBHItJI5svbpez7KI4CCXg";

async fn subscribe(store: &MemoryStore, id: &str, signer: &RotatingSigner) {
    let subscription =
        Subscription::from_base64(format!("https://push.example.com/{}", id), P256DH, AUTH)
            .unwrap();
    store
        .save(SubscriptionRecord::new(id, subscription).with_vapid_key(signer.public_key_base64()))
        .await
        .unwrap();
}

#[tokio::test]
async fn keys_live_until_their_last_subscriber_leaves() {
    let store = MemoryStore::new();
    let signer = RotatingSigner::new(Arc::new(FileSigner::random().unwrap()));
    let first = signer.public_key_base64();
    subscribe(&store, "early", &signer).await;

    signer.rotate(Arc::new(FileSigner::random().unwrap()));
    let second = signer.public_key_base64();

    signer.rotate(Arc::new(FileSigner::random().unwrap()));
    subscribe(&store, "late", &signer).await;

    let cleanup = signer.remove_unused_keys(&store).await.unwrap();
    assert_eq!(cleanup.removed, [second.clone()]);
    assert_eq!(cleanup.retained, [first.clone()]);
    assert_eq!(signer.key_count(), 2);

    store.delete("early").await.unwrap();
    let cleanup = signer.remove_unused_keys(&store).await.unwrap();
    assert_eq!(cleanup.removed, [first.clone()]);
    assert!(cleanup.retained.is_empty());
    assert_eq!(signer.key_count(), 1);
    assert!(!signer.is_known_key(first.as_str()));
}

#[tokio::test]
async fn any_store_can_answer_usage_queries() {
    let store: Arc<dyn SubscriptionStore> = Arc::new(MemoryStore::new());
    let signer = RotatingSigner::new(Arc::new(FileSigner::random().unwrap()));
    let old = signer.public_key_base64();
    let subscription =
        Subscription::from_base64("https://push.example.com/x", P256DH, AUTH).unwrap();
    store
        .save(SubscriptionRecord::new("x", subscription).with_vapid_key(old.clone()))
        .await
        .unwrap();
    signer.rotate(Arc::new(FileSigner::random().unwrap()));

    let usage = StoreUsage(store.clone());
    let cleanup = signer.remove_unused_keys(&usage).await.unwrap();
    assert!(cleanup.removed.is_empty());
    assert_eq!(cleanup.retained, [old.clone()]);

    store
        .delete_by_endpoint("https://push.example.com/x")
        .await
        .unwrap();
    let cleanup = signer.remove_unused_keys(&usage).await.unwrap();
    assert_eq!(cleanup.removed, [old]);
}
