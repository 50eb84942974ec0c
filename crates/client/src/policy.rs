//! Per-operation error policy.
//!
//! Two failure treatments exist: surface the message in the single
//! user-visible error slot, or log it and move on. The split is a contract,
//! not an accident — the auto-summary and the session delete are best-effort
//! side operations that must never block the main flow.
//!
//! | Operation     | Policy  |
//! |---------------|---------|
//! | Upload        | Surface |
//! | Query         | Surface |
//! | Analyze       | LogOnly |
//! | DeleteSession | LogOnly |

/// Network-touching operations of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Analyze,
    Query,
    DeleteSession,
}

/// What to do with a failure of the given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Show the message to the user (replacing any prior error).
    Surface,
    /// Log for diagnostics; never user-visible, never blocking.
    LogOnly,
}

/// The policy table. Single source of truth — the controller's failure
/// handling dispatches through here.
pub fn error_policy(op: Operation) -> ErrorPolicy {
    match op {
        Operation::Upload | Operation::Query => ErrorPolicy::Surface,
        Operation::Analyze | Operation::DeleteSession => ErrorPolicy::LogOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaced_operations() {
        assert_eq!(error_policy(Operation::Upload), ErrorPolicy::Surface);
        assert_eq!(error_policy(Operation::Query), ErrorPolicy::Surface);
    }

    #[test]
    fn best_effort_operations() {
        assert_eq!(error_policy(Operation::Analyze), ErrorPolicy::LogOnly);
        assert_eq!(error_policy(Operation::DeleteSession), ErrorPolicy::LogOnly);
    }
}
