//! Coordinator state machine.

use std::fmt;

/// State of a transaction coordinator.
///
/// The machine advances `Idle → Began → {Committed, RolledBack}` over one
/// batch; a coordinator is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// No transaction is open.
    Idle,
    /// Transactions are open on every collected connection.
    Began,
    /// All transactions were committed.
    Committed,
    /// All transactions were rolled back.
    RolledBack,
}

impl fmt::Display for TxnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnState::Idle => write!(f, "idle"),
            TxnState::Began => write!(f, "began"),
            TxnState::Committed => write!(f, "committed"),
            TxnState::RolledBack => write!(f, "rolled-back"),
        }
    }
}
