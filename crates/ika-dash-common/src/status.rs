//! Watch status shown to the user
//!
//! The four terminal statuses stay distinct all the way to the screen so a
//! timeout ("give it longer") never reads like an error ("something is
//! broken").

/// Presentation status of a watch
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WatchStatus {
    /// Nothing started yet
    #[default]
    Idle,
    /// Attempts in progress
    Polling,
    /// Target state reached
    Success,
    /// Deadline passed without a match
    Timeout,
    /// Non-retriable fetch error
    Error,
    /// Cancelled by the user
    Cancelled,
}

impl WatchStatus {
    /// Check if the status represents a terminal state
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Polling)
    }

    /// Badge label; a successful watch shows the state it reached
    pub fn label(self, target_state: &str) -> String {
        match self {
            Self::Idle => "Idle".to_string(),
            Self::Polling => "Polling...".to_string(),
            Self::Success => target_state.to_string(),
            Self::Timeout => "Timeout".to_string(),
            Self::Error => "Error".to_string(),
            Self::Cancelled => "Cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal() {
        assert!(!WatchStatus::Idle.is_terminal());
        assert!(!WatchStatus::Polling.is_terminal());
        assert!(WatchStatus::Success.is_terminal());
        assert!(WatchStatus::Timeout.is_terminal());
        assert!(WatchStatus::Error.is_terminal());
        assert!(WatchStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels: std::collections::HashSet<_> = [
            WatchStatus::Success,
            WatchStatus::Timeout,
            WatchStatus::Error,
            WatchStatus::Cancelled,
        ]
        .into_iter()
        .map(|s| s.label("Active"))
        .collect();
        assert_eq!(labels.len(), 4);
        assert_eq!(WatchStatus::Success.label("Completed"), "Completed");
    }

    #[test]
    fn test_display() {
        assert_eq!(WatchStatus::Cancelled.to_string(), "cancelled");
        assert_eq!("TIMEOUT".parse::<WatchStatus>().ok(), Some(WatchStatus::Timeout));
    }
}
