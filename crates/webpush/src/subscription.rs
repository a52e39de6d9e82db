//! Browser push subscriptions (`PushSubscription.toJSON()` shape).

use std::fmt;

use serde::{Deserialize, Serialize};
use webpush_crypto::{
    base64url_decode, base64url_encode, AuthSecret, PublicKeyBytes, AUTH_SECRET_LENGTH,
    PUBLIC_KEY_LENGTH,
};

use crate::error::PushError;

/// Where and how to deliver an encrypted message to one subscriber.
///
/// Immutable once built. Serialises to and from
/// `{"endpoint": ..., "keys": {"p256dh": ..., "auth": ...}}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SubscriptionJson", into = "SubscriptionJson")]
pub struct Subscription {
    endpoint: String,
    p256dh: PublicKeyBytes,
    auth: AuthSecret,
}

#[derive(Serialize, Deserialize)]
struct SubscriptionJson {
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    keys: SubscriptionKeys,
}

#[derive(Default, Serialize, Deserialize)]
struct SubscriptionKeys {
    #[serde(default)]
    p256dh: String,
    #[serde(default)]
    auth: String,
}

impl Subscription {
    /// Build from raw key bytes.
    ///
    /// Only the shapes are checked here. The endpoint scheme is checked by
    /// [`PushClient::send`](crate::PushClient::send) and the curve point by
    /// the encryptor.
    pub fn new(endpoint: impl Into<String>, p256dh: &[u8], auth: &[u8]) -> Result<Self, PushError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(PushError::InvalidSubscription("endpoint is required".into()));
        }
        let p256dh = PublicKeyBytes::try_from(p256dh).map_err(|_| {
            PushError::InvalidSubscription(format!(
                "p256dh must be {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                p256dh.len()
            ))
        })?;
        if p256dh[0] != 0x04 {
            return Err(PushError::InvalidSubscription(
                "p256dh must be an uncompressed P-256 point".into(),
            ));
        }
        let auth = AuthSecret::try_from(auth).map_err(|_| {
            PushError::InvalidSubscription(format!(
                "auth must be {} bytes, got {}",
                AUTH_SECRET_LENGTH,
                auth.len()
            ))
        })?;
        Ok(Self {
            endpoint,
            p256dh,
            auth,
        })
    }

    /// Build from the base64url strings a browser hands out.
    pub fn from_base64(
        endpoint: impl Into<String>,
        p256dh: &str,
        auth: &str,
    ) -> Result<Self, PushError> {
        if p256dh.is_empty() {
            return Err(PushError::InvalidSubscription("p256dh key is required".into()));
        }
        if auth.is_empty() {
            return Err(PushError::InvalidSubscription("auth key is required".into()));
        }
        let p256dh = base64url_decode(p256dh)
            .map_err(|e| PushError::InvalidSubscription(format!("p256dh: {}", e)))?;
        let auth = base64url_decode(auth)
            .map_err(|e| PushError::InvalidSubscription(format!("auth: {}", e)))?;
        Self::new(endpoint, &p256dh, &auth)
    }

    /// Parse subscription JSON as produced by the browser.
    ///
    /// Unlike [`Subscription::new`], this also requires an `https://` endpoint.
    pub fn parse(json: &str) -> Result<Self, PushError> {
        let wire: SubscriptionJson = serde_json::from_str(json)
            .map_err(|e| PushError::InvalidSubscription(e.to_string()))?;
        let subscription = Subscription::try_from(wire)?;
        if !subscription.endpoint.starts_with("https://") {
            return Err(PushError::InsecureEndpoint(subscription.endpoint));
        }
        Ok(subscription)
    }

    pub fn to_json(&self) -> String {
        let wire = SubscriptionJson::from(self.clone());
        // Two string fields; serialisation cannot fail.
        serde_json::to_string(&wire).unwrap_or_default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn client_public_key(&self) -> &PublicKeyBytes {
        &self.p256dh
    }

    pub fn auth_secret(&self) -> &AuthSecret {
        &self.auth
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("endpoint", &self.endpoint)
            .field("p256dh", &base64url_encode(&self.p256dh))
            .finish_non_exhaustive()
    }
}

impl TryFrom<SubscriptionJson> for Subscription {
    type Error = PushError;

    fn try_from(wire: SubscriptionJson) -> Result<Self, Self::Error> {
        if wire.endpoint.is_empty() {
            return Err(PushError::InvalidSubscription("endpoint is required".into()));
        }
        Subscription::from_base64(wire.endpoint, &wire.keys.p256dh, &wire.keys.auth)
    }
}

impl From<Subscription> for SubscriptionJson {
    fn from(subscription: Subscription) -> Self {
        SubscriptionJson {
            keys: SubscriptionKeys {
                p256dh: base64url_encode(&subscription.p256dh),
                auth: base64url_encode(&subscription.auth),
            },
            endpoint: subscription.endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const P256DH: &str =
        "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM";
    const AUTH: &str = "tBHItJI5svbpez7KI4CCXg";

    fn browser_json(endpoint: &str) -> String {
        json!({
            "endpoint": endpoint,
            "expirationTime": null,
            "keys": { "p256dh": P256DH, "auth": AUTH }
        })
        .to_string()
    }

    #[test]
    fn parses_browser_subscription() {
        let sub = Subscription::parse(&browser_json("https://fcm.googleapis.com/fcm/send/abc")).unwrap();
        assert_eq!(sub.endpoint(), "https://fcm.googleapis.com/fcm/send/abc");
        assert_eq!(sub.client_public_key()[0], 0x04);
        assert_eq!(sub.auth_secret().len(), 16);
    }

    #[test]
    fn rejects_http_endpoint() {
        let err = Subscription::parse(&browser_json("http://push.example.com/x")).unwrap_err();
        assert!(matches!(err, PushError::InsecureEndpoint(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let no_endpoint = json!({"keys": {"p256dh": P256DH, "auth": AUTH}}).to_string();
        assert!(Subscription::parse(&no_endpoint)
            .unwrap_err()
            .to_string()
            .contains("endpoint is required"));

        let no_auth = json!({"endpoint": "https://a.example", "keys": {"p256dh": P256DH}}).to_string();
        assert!(Subscription::parse(&no_auth)
            .unwrap_err()
            .to_string()
            .contains("auth key is required"));

        let no_keys = json!({"endpoint": "https://a.example"}).to_string();
        assert!(Subscription::parse(&no_keys)
            .unwrap_err()
            .to_string()
            .contains("p256dh key is required"));
    }

    #[test]
    fn rejects_bad_key_material() {
        let short_auth = json!({
            "endpoint": "https://a.example",
            "keys": { "p256dh": P256DH, "auth": "AAAA" }
        })
        .to_string();
        assert!(Subscription::parse(&short_auth)
            .unwrap_err()
            .to_string()
            .contains("auth must be 16 bytes, got 3"));

        let garbage = json!({
            "endpoint": "https://a.example",
            "keys": { "p256dh": "not base64!", "auth": AUTH }
        })
        .to_string();
        assert!(matches!(
            Subscription::parse(&garbage),
            Err(PushError::InvalidSubscription(_))
        ));
    }

    #[test]
    fn rejects_compressed_point() {
        let mut compressed = vec![0x02u8];
        compressed.extend_from_slice(&[0x11; 64]);
        let err = Subscription::new("https://a.example", &compressed, &[0u8; 16]).unwrap_err();
        assert!(err.to_string().contains("uncompressed"));
    }

    #[test]
    fn json_round_trip_preserves_shape() {
        let sub = Subscription::parse(&browser_json("https://push.example.com/1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&sub.to_json()).unwrap();
        assert_eq!(value["endpoint"], "https://push.example.com/1");
        assert_eq!(value["keys"]["p256dh"], P256DH);
        assert_eq!(value["keys"]["auth"], AUTH);
    }

    #[test]
    fn new_allows_any_scheme() {
        let p256dh = base64url_decode(P256DH).unwrap();
        let auth = base64url_decode(AUTH).unwrap();
        assert!(Subscription::new("http://localhost/x", &p256dh, &auth).is_ok());
    }

    #[test]
    fn debug_hides_auth_secret() {
        let sub = Subscription::parse(&browser_json("https://push.example.com/1")).unwrap();
        assert!(!format!("{:?}", sub).contains(AUTH));
    }
}
