//! Per-message delivery options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default `TTL` header: four weeks, in seconds.
pub const DEFAULT_TTL: u32 = 2_419_200;

/// RFC 8030 §5.3 message urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            other => Err(format!("unknown urgency: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendOptions {
    /// Seconds the push service may hold the message. `None` sends
    /// [`DEFAULT_TTL`]; `Some(0)` is sent as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Omitted from the request when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// Replaces any pending message with the same topic. Omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl SendOptions {
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn ttl_or_default(&self) -> u32 {
        self.ttl.unwrap_or(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_four_weeks() {
        assert_eq!(SendOptions::default().ttl_or_default(), 4 * 7 * 24 * 60 * 60);
        assert_eq!(SendOptions::default().with_ttl(0).ttl_or_default(), 0);
    }

    #[test]
    fn urgency_wire_names() {
        assert_eq!(
            serde_json::to_string(&Urgency::VeryLow).unwrap(),
            "\"very-low\""
        );
        assert_eq!("high".parse::<Urgency>().unwrap(), Urgency::High);
        assert!("urgent".parse::<Urgency>().is_err());
        assert_eq!(Urgency::Normal.to_string(), "normal");
    }

    #[test]
    fn deserializes_partial_options() {
        let options: SendOptions =
            serde_json::from_str(r#"{"urgency":"low","topic":"inbox"}"#).unwrap();
        assert_eq!(options.ttl, None);
        assert_eq!(options.urgency, Some(Urgency::Low));
        assert_eq!(options.topic.as_deref(), Some("inbox"));
    }

    #[test]
    fn serializes_only_set_fields() {
        let json = serde_json::to_string(&SendOptions::default().with_ttl(60)).unwrap();
        assert_eq!(json, r#"{"ttl":60}"#);
    }
}
