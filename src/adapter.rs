use async_trait::async_trait;

use crate::ast::{SelectModifier, SelectQueryNode, TableNode};
use crate::compiler::FirebirdQueryCompiler;
use crate::connection::DatabaseConnection;
use crate::error::FirebirdDbError;

/// Where the migration lock row lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationLockOptions {
    pub lock_table: String,
    pub lock_row_id: String,
    pub lock_table_schema: Option<String>,
}

impl Default for MigrationLockOptions {
    fn default() -> Self {
        Self {
            lock_table: "kysely_migration_lock".into(),
            lock_row_id: "migration_lock".into(),
            lock_table_schema: None,
        }
    }
}

/// Engine capabilities and migration locking, as seen by a query builder.
#[async_trait]
pub trait DialectAdapter: Send + Sync {
    fn supports_create_if_not_exists(&self) -> bool;

    fn supports_transactional_ddl(&self) -> bool;

    fn supports_returning(&self) -> bool;

    async fn acquire_migration_lock(
        &self,
        connection: &(dyn DatabaseConnection + 'static),
        options: &MigrationLockOptions,
    ) -> Result<(), FirebirdDbError>;

    async fn release_migration_lock(
        &self,
        connection: &(dyn DatabaseConnection + 'static),
        options: &MigrationLockOptions,
    ) -> Result<(), FirebirdDbError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdAdapter;

impl FirebirdAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// `select * from [schema.]<lock_table> where id = ? for update with lock`
    #[must_use]
    pub fn migration_lock_query(options: &MigrationLockOptions) -> SelectQueryNode {
        let mut table = TableNode::new(options.lock_table.as_str());
        if let Some(schema) = &options.lock_table_schema {
            table = table.with_schema(schema.as_str());
        }
        SelectQueryNode::from(crate::ast::OperationNode::Table(table))
            .select_all()
            .where_eq("id", options.lock_row_id.as_str())
            .modifier(SelectModifier::ForUpdate)
            .modifier(SelectModifier::WithLock)
    }
}

#[async_trait]
impl DialectAdapter for FirebirdAdapter {
    fn supports_create_if_not_exists(&self) -> bool {
        false
    }

    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    fn supports_returning(&self) -> bool {
        true
    }

    /// Lock the migration row for the rest of the caller's transaction.
    async fn acquire_migration_lock(
        &self,
        connection: &(dyn DatabaseConnection + 'static),
        options: &MigrationLockOptions,
    ) -> Result<(), FirebirdDbError> {
        let query = FirebirdQueryCompiler::new().compile(&Self::migration_lock_query(options).into())?;
        connection.execute_query(&query).await?;
        Ok(())
    }

    /// The row lock ends with the transaction; nothing to do.
    async fn release_migration_lock(
        &self,
        _connection: &(dyn DatabaseConnection + 'static),
        _options: &MigrationLockOptions,
    ) -> Result<(), FirebirdDbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities() {
        let adapter = FirebirdAdapter::new();
        assert!(adapter.supports_returning());
        assert!(adapter.supports_transactional_ddl());
        assert!(!adapter.supports_create_if_not_exists());
    }

    #[test]
    fn lock_query_targets_schema_qualified_table() {
        let options = MigrationLockOptions {
            lock_table_schema: Some("admin".into()),
            ..MigrationLockOptions::default()
        };
        let compiled = FirebirdQueryCompiler::new()
            .compile(&FirebirdAdapter::migration_lock_query(&options).into())
            .unwrap();
        assert_eq!(
            compiled.sql,
            "select * from admin.kysely_migration_lock where id = ? for update with lock"
        );
        assert_eq!(
            compiled.parameters,
            vec![crate::types::RowValues::from("migration_lock")]
        );
    }
}
