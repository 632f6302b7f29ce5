//! Lifecycle state extraction
//!
//! Remote objects report where they are in their pipeline in a handful of
//! conventional shapes:
//!
//! | Shape | Example |
//! |-------|---------|
//! | tagged enum | `{ "state": { "$kind": "Active", ... } }` |
//! | plain state | `{ "state": "Active" }` |
//! | status field | `{ "status": "Completed" }` |
//! | phase field | `{ "phase": "Signing" }` |
//!
//! The first shape present wins. Null fields count as absent.

use serde_json::Value;

/// Tag key carried by discriminated enum values
pub const KIND_TAG: &str = "$kind";

/// Top-level fields consulted after the tagged `state`, in priority order
const STATE_FIELDS: &[&str] = &["state", "status", "phase"];

/// Derive a state label from a fetched snapshot.
///
/// Returns `None` when no known field is present. A `state` object without
/// a `$kind` tag is skipped so that a plain `status` or `phase` can still
/// be used.
pub fn extract_state(snapshot: &Value) -> Option<String> {
    if let Some(kind) = snapshot
        .get("state")
        .and_then(|state| state.get(KIND_TAG))
        .and_then(scalar_label)
    {
        return Some(kind);
    }

    STATE_FIELDS
        .iter()
        .find_map(|field| snapshot.get(field).and_then(scalar_label))
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Snapshots that can report their own lifecycle state
pub trait LifecycleState {
    fn lifecycle_state(&self) -> Option<String>;
}

impl LifecycleState for Value {
    fn lifecycle_state(&self) -> Option<String> {
        extract_state(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_state() {
        let snapshot = json!({ "state": { "$kind": "Active", "Active": {} } });
        assert_eq!(extract_state(&snapshot).as_deref(), Some("Active"));
    }

    #[test]
    fn test_plain_state() {
        let snapshot = json!({ "state": "Pending", "status": "ignored" });
        assert_eq!(extract_state(&snapshot).as_deref(), Some("Pending"));
    }

    #[test]
    fn test_status_and_phase() {
        assert_eq!(
            extract_state(&json!({ "status": "Completed" })).as_deref(),
            Some("Completed")
        );
        assert_eq!(
            extract_state(&json!({ "phase": "Signing" })).as_deref(),
            Some("Signing")
        );
    }

    #[test]
    fn test_status_beats_phase() {
        let snapshot = json!({ "phase": "Signing", "status": "Completed" });
        assert_eq!(extract_state(&snapshot).as_deref(), Some("Completed"));
    }

    #[test]
    fn test_untagged_state_object_falls_through() {
        let snapshot = json!({ "state": { "inner": 1 }, "status": "Requested" });
        assert_eq!(extract_state(&snapshot).as_deref(), Some("Requested"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let snapshot = json!({ "state": null, "phase": "Done" });
        assert_eq!(extract_state(&snapshot).as_deref(), Some("Done"));
    }

    #[test]
    fn test_scalars_are_stringified() {
        assert_eq!(extract_state(&json!({ "status": 3 })).as_deref(), Some("3"));
        assert_eq!(
            extract_state(&json!({ "state": { "$kind": true } })).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_absent_or_malformed() {
        assert_eq!(extract_state(&json!({})), None);
        assert_eq!(extract_state(&json!(null)), None);
        assert_eq!(extract_state(&json!([1, 2, 3])), None);
        assert_eq!(extract_state(&json!("Active")), None);
        assert_eq!(extract_state(&json!({ "state": [] })), None);
    }

    #[test]
    fn test_trait_delegates() {
        let snapshot = json!({ "status": "Completed" });
        assert_eq!(snapshot.lifecycle_state().as_deref(), Some("Completed"));
    }
}
