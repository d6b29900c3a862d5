use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Creation,
    Webhook,
    StatusCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponseEntry {
    pub source: ResponseSource,
    pub received_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Every raw provider payload seen for a payment, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderResponseLog {
    entries: Vec<ProviderResponseEntry>,
}

impl ProviderResponseLog {
    pub fn seeded(payload: serde_json::Value, received_at: DateTime<Utc>) -> Self {
        Self {
            entries: vec![ProviderResponseEntry {
                source: ResponseSource::Creation,
                received_at,
                payload,
            }],
        }
    }

    /// Appends `payload` unless the latest entry from the same source already
    /// holds an identical body. Returns whether an entry was added.
    pub fn record(
        &mut self,
        source: ResponseSource,
        payload: serde_json::Value,
        received_at: DateTime<Utc>,
    ) -> bool {
        let duplicate = self
            .entries
            .iter()
            .rev()
            .find(|e| e.source == source)
            .map(|e| e.payload == payload)
            .unwrap_or(false);
        if duplicate {
            return false;
        }

        self.entries.push(ProviderResponseEntry {
            source,
            received_at,
            payload,
        });
        true
    }

    pub fn entries(&self) -> &[ProviderResponseEntry] {
        &self.entries
    }

    pub fn creation(&self) -> Option<&ProviderResponseEntry> {
        self.entries.iter().find(|e| e.source == ResponseSource::Creation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
