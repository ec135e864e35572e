//! Unit-of-work configuration.

/// Configuration for a [`UnitOfWork`](crate::UnitOfWork).
#[derive(Debug, Clone)]
pub struct WorkConfig {
    /// Whether to clear the pending-operation registry after a successful
    /// `exec`, so the same instance can be reused for a fresh batch. On
    /// failure the registry is always retained for inspection.
    pub clear_after_exec: bool,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            clear_after_exec: true,
        }
    }
}

impl WorkConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the registry is cleared after a successful `exec`.
    #[must_use]
    pub const fn clear_after_exec(mut self, value: bool) -> Self {
        self.clear_after_exec = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clears_after_exec() {
        assert!(WorkConfig::default().clear_after_exec);
    }

    #[test]
    fn builder_pattern() {
        let config = WorkConfig::new().clear_after_exec(false);
        assert!(!config.clear_after_exec);
    }
}
