use std::fmt;
use std::sync::Arc;

use crate::dialect::FirebirdDialect;
use crate::native::NativePool;
use crate::transaction::IsolationLevel;

/// Options shared by everything a [`FirebirdDialect`] creates.
#[derive(Clone)]
pub struct FirebirdDialectConfig {
    pub pool: Arc<dyn NativePool>,
    /// Used when `begin_transaction` is called without an explicit level.
    pub default_isolation_level: IsolationLevel,
    /// Write parameter values into logged SQL; when off, SQL is logged with its markers.
    pub inline_log_parameters: bool,
}

impl FirebirdDialectConfig {
    #[must_use]
    pub fn new(pool: Arc<dyn NativePool>) -> Self {
        Self {
            pool,
            default_isolation_level: IsolationLevel::default(),
            inline_log_parameters: true,
        }
    }

    #[must_use]
    pub fn with_default_isolation_level(mut self, isolation_level: IsolationLevel) -> Self {
        self.default_isolation_level = isolation_level;
        self
    }

    #[must_use]
    pub fn with_inline_log_parameters(mut self, inline: bool) -> Self {
        self.inline_log_parameters = inline;
        self
    }
}

impl fmt::Debug for FirebirdDialectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebirdDialectConfig")
            .field("default_isolation_level", &self.default_isolation_level)
            .field("inline_log_parameters", &self.inline_log_parameters)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`FirebirdDialectConfig`].
#[derive(Debug, Clone)]
pub struct FirebirdDialectConfigBuilder {
    config: FirebirdDialectConfig,
}

impl FirebirdDialectConfigBuilder {
    #[must_use]
    pub fn new(pool: Arc<dyn NativePool>) -> Self {
        Self {
            config: FirebirdDialectConfig::new(pool),
        }
    }

    #[must_use]
    pub fn isolation_level(mut self, isolation_level: IsolationLevel) -> Self {
        self.config.default_isolation_level = isolation_level;
        self
    }

    #[must_use]
    pub fn inline_log_parameters(mut self, inline: bool) -> Self {
        self.config.inline_log_parameters = inline;
        self
    }

    #[must_use]
    pub fn finish(self) -> FirebirdDialectConfig {
        self.config
    }

    #[must_use]
    pub fn build(self) -> FirebirdDialect {
        FirebirdDialect::new(self.finish())
    }
}

impl FirebirdDialectConfig {
    #[must_use]
    pub fn builder(pool: Arc<dyn NativePool>) -> FirebirdDialectConfigBuilder {
        FirebirdDialectConfigBuilder::new(pool)
    }
}
