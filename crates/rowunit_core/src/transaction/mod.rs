//! Multi-connection transaction coordination.

mod coordinator;
mod state;

pub use coordinator::{collect_all_connections, collect_connections, TxnCoordinator};
pub use state::TxnState;
