//! Transfer state machine

use std::fmt;

/// Pipeline position of a transfer
///
/// ```text
/// Start → SafetyChecked → Locked → Fetched → Transformed → Archived → Purged → Done
///   └──────────────┴────────────┴─────────┴───────────┴──────────┴────────┴──► Aborted
/// ```
///
/// A failing step moves the run to `Aborted`; the state it left is kept in
/// [`TransferError::state`](crate::TransferError::state) and the aborted
/// report in [`TransferError::report`](crate::TransferError::report).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransferState {
    /// Nothing checked yet
    Start,
    /// No staging file, archive or lock marker present
    SafetyChecked,
    /// Lock marker held
    Locked,
    /// Snapshot fetched from the store
    Fetched,
    /// Orders built; a dry run ends here
    Transformed,
    /// Archive committed at its target path
    Archived,
    /// Fetched documents deleted from the store
    Purged,
    /// Lock released after a full run
    Done,
    /// A step failed
    Aborted,
}

impl TransferState {
    /// Lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Start => "start",
            TransferState::SafetyChecked => "safety-checked",
            TransferState::Locked => "locked",
            TransferState::Fetched => "fetched",
            TransferState::Transformed => "transformed",
            TransferState::Archived => "archived",
            TransferState::Purged => "purged",
            TransferState::Done => "done",
            TransferState::Aborted => "aborted",
        }
    }

    /// Next state on success, `None` for terminal states
    ///
    /// `Aborted` is entered from any non-terminal state on failure rather
    /// than through `next`.
    pub fn next(&self) -> Option<TransferState> {
        match self {
            TransferState::Start => Some(TransferState::SafetyChecked),
            TransferState::SafetyChecked => Some(TransferState::Locked),
            TransferState::Locked => Some(TransferState::Fetched),
            TransferState::Fetched => Some(TransferState::Transformed),
            TransferState::Transformed => Some(TransferState::Archived),
            TransferState::Archived => Some(TransferState::Purged),
            TransferState::Purged => Some(TransferState::Done),
            TransferState::Done | TransferState::Aborted => None,
        }
    }

    /// Check if the run cannot advance from this state
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Whether the archive has been committed by the time this state is reached
    pub fn archive_committed(&self) -> bool {
        matches!(
            self,
            TransferState::Archived | TransferState::Purged | TransferState::Done
        )
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_progression() {
        let mut state = TransferState::Start;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(next > state);
            state = next;
            visited.push(state);
        }
        assert_eq!(state, TransferState::Done);
        assert_eq!(visited.len(), 8);
        assert!(!visited.contains(&TransferState::Aborted));
    }

    #[test]
    fn test_terminal_states() {
        assert!(TransferState::Done.is_terminal());
        assert!(TransferState::Aborted.is_terminal());
        assert!(!TransferState::Transformed.is_terminal());
    }

    #[test]
    fn test_archive_committed() {
        assert!(!TransferState::Transformed.archive_committed());
        assert!(TransferState::Archived.archive_committed());
        assert_eq!(TransferState::SafetyChecked.to_string(), "safety-checked");
    }
}
