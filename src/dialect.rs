use crate::adapter::FirebirdAdapter;
use crate::compiler::FirebirdQueryCompiler;
use crate::config::FirebirdDialectConfig;
use crate::connection::DatabaseConnection;
use crate::driver::FirebirdDriver;
use crate::introspection::FirebirdIntrospector;

/// Entry point that hands a query builder everything it needs to talk to Firebird.
#[derive(Debug, Clone)]
pub struct FirebirdDialect {
    config: FirebirdDialectConfig,
}

impl FirebirdDialect {
    #[must_use]
    pub fn new(config: FirebirdDialectConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FirebirdDialectConfig {
        &self.config
    }

    #[must_use]
    pub fn create_driver(&self) -> FirebirdDriver {
        FirebirdDriver::new(self.config.clone())
    }

    #[must_use]
    pub fn create_adapter(&self) -> FirebirdAdapter {
        FirebirdAdapter::new()
    }

    #[must_use]
    pub fn create_query_compiler(&self) -> FirebirdQueryCompiler {
        FirebirdQueryCompiler::new()
    }

    #[must_use]
    pub fn create_introspector<'c>(
        &self,
        connection: &'c dyn DatabaseConnection,
    ) -> FirebirdIntrospector<'c> {
        FirebirdIntrospector::new(connection)
    }
}
