//! Best-effort analytics recording.
//!
//! Events ride alongside financial operations but must never fail them: by
//! the time an event is recorded the financial state is already committed,
//! and committed state is not rolled back for a logging fault.

use velora_core::{AnalyticsEvent, UserId};
use velora_store::Store;

/// Record an analytics event, swallowing (but logging) any storage fault.
pub fn record(store: &dyn Store, user_id: UserId, event_type: &str, event_data: serde_json::Value) {
    let event = AnalyticsEvent::new(user_id, event_type, event_data);
    if let Err(e) = store.put_analytics_event(&event) {
        tracing::warn!(
            error = %e,
            user_id = %user_id,
            event_type = %event_type,
            "Failed to record analytics event"
        );
    }
}
