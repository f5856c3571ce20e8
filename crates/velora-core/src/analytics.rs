//! Analytics event records.
//!
//! Events are recorded best-effort alongside financial state changes; a
//! failure to record one must never fail the operation that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::UserId;

/// A single analytics event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Unique event ID (ULID for time-ordering).
    pub id: String,

    /// The user the event belongs to.
    pub user_id: UserId,

    /// Event type, e.g. `"chat_message"` or `"subscription_purchase"`.
    pub event_type: String,

    /// Free-form event payload.
    pub event_data: serde_json::Value,

    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Create a new event with a generated ID.
    #[must_use]
    pub fn new(user_id: UserId, event_type: &str, event_data: serde_json::Value) -> Self {
        Self {
            id: Ulid::new().to_string(),
            user_id,
            event_type: event_type.to_string(),
            event_data,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_get_distinct_ids() {
        let user_id = UserId::generate();
        let a = AnalyticsEvent::new(user_id, "chat_message", serde_json::json!({"coin_cost": 1}));
        let b = AnalyticsEvent::new(user_id, "chat_message", serde_json::json!({"coin_cost": 1}));
        assert_ne!(a.id, b.id);
        assert_eq!(a.event_type, "chat_message");
    }
}
