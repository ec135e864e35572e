//! Closure-scoped transactions over a mapper set.

use crate::error::CoreResult;
use crate::mapper::MapperLocator;
use crate::transaction::{collect_all_connections, TxnCoordinator};
use std::sync::Arc;
use tracing::warn;

/// Runs arbitrary mapper work inside one transaction.
///
/// Where [`UnitOfWork`](crate::UnitOfWork) batches pre-registered
/// operations, a scope wraps an ad-hoc closure: transactions begin on the
/// distinct write connections of *every* mapper in the locator (the scope
/// cannot know in advance which ones the closure touches), the closure runs,
/// and the scope commits on `Ok` or rolls back on `Err`.
#[derive(Debug)]
pub struct TransactionScope {
    mappers: Arc<MapperLocator>,
}

impl TransactionScope {
    /// Creates a scope over a mapper locator.
    #[must_use]
    pub fn new(mappers: Arc<MapperLocator>) -> Self {
        Self { mappers }
    }

    /// Executes a closure transactionally.
    ///
    /// The closure's error is the one returned; a rollback error after a
    /// failed closure is logged, not propagated.
    pub fn exec<T>(
        &self,
        queries: impl FnOnce(&MapperLocator) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let connections = collect_all_connections(&self.mappers)?;
        let mut coordinator = TxnCoordinator::new(connections);
        coordinator.begin()?;
        match queries(&self.mappers) {
            Ok(value) => {
                coordinator.commit()?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rb) = coordinator.rollback() {
                    warn!(error = %rb, "rollback reported an error");
                }
                Err(error)
            }
        }
    }
}
