//! Mapper locator: named, lazily-instantiated mapper registry.

use crate::error::{CoreError, CoreResult};
use crate::mapper::Mapper;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A factory producing a mapper on first resolution.
pub type MapperFactory = Box<dyn Fn() -> Arc<dyn Mapper> + Send + Sync>;

#[derive(Default)]
struct Registry {
    order: Vec<String>,
    factories: HashMap<String, MapperFactory>,
    instances: HashMap<String, Arc<dyn Mapper>>,
}

/// A registry of named mappers, instantiated lazily.
///
/// Resolution checks the instance map first and falls back to invoking the
/// registered factory exactly once, memoizing the result for the locator's
/// lifetime. The locator is an explicit value passed wherever it is needed;
/// there is no ambient global registry.
#[derive(Default)]
pub struct MapperLocator {
    inner: Mutex<Registry>,
}

impl MapperLocator {
    /// Creates an empty locator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mapper factory under a name.
    ///
    /// Re-registering a name replaces the factory and drops any memoized
    /// instance.
    pub fn set(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Arc<dyn Mapper> + Send + Sync + 'static,
    ) {
        let name = name.into();
        let mut inner = self.inner.lock();
        if !inner.factories.contains_key(&name) {
            inner.order.push(name.clone());
        }
        inner.instances.remove(&name);
        inner.factories.insert(name, Box::new(factory));
    }

    /// Registers a factory, chaining.
    #[must_use]
    pub fn with(
        self,
        name: impl Into<String>,
        factory: impl Fn() -> Arc<dyn Mapper> + Send + Sync + 'static,
    ) -> Self {
        self.set(name, factory);
        self
    }

    /// Resolves a mapper by name.
    pub fn get(&self, name: &str) -> CoreResult<Arc<dyn Mapper>> {
        let mut inner = self.inner.lock();
        if let Some(mapper) = inner.instances.get(name) {
            return Ok(Arc::clone(mapper));
        }
        let factory = inner
            .factories
            .get(name)
            .ok_or_else(|| CoreError::no_such_mapper(name))?;
        let mapper = factory();
        inner.instances.insert(name.to_owned(), Arc::clone(&mapper));
        Ok(mapper)
    }

    /// Returns true if a mapper is registered under the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().factories.contains_key(name)
    }

    /// Returns registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.lock().order.clone()
    }
}

impl fmt::Debug for MapperLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperLocator")
            .field("names", &self.names())
            .finish()
    }
}
