//! Convenient imports for common functionality.
//!
//! Re-exports the types most callers touch: the dialect and its parts, the AST builders
//! and the value/result types.

pub use crate::adapter::{DialectAdapter, FirebirdAdapter, MigrationLockOptions};
pub use crate::ast::{
    BinaryOperator, ColumnDefinitionNode, CreateTableNode, DataType, DeleteQueryNode,
    InsertQueryNode, JoinType, OperationNode, OrderDirection, SelectModifier, SelectQueryNode,
    TableNode, UnaryOperator, UpdateQueryNode, binary, col, function, lit, raw, reference, table,
    unary, val,
};
pub use crate::codegen::{GenerateOutcome, GeneratorOptions, GeneratorTarget, generate};
pub use crate::compiler::{CompiledQuery, FirebirdQueryCompiler};
pub use crate::config::{FirebirdDialectConfig, FirebirdDialectConfigBuilder};
pub use crate::connection::{ConnectionId, DatabaseConnection, FirebirdConnection};
pub use crate::dialect::FirebirdDialect;
pub use crate::driver::{Driver, FirebirdDriver};
pub use crate::error::{ErrorClass, FirebirdDbError};
pub use crate::introspection::{ColumnMetadata, FieldType, FirebirdIntrospector, TableMetadata};
pub use crate::native::{NativeDatabase, NativeError, NativePool, NativeResult, NativeTransaction};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::transaction::{IsolationLevel, TransactionSettings};
pub use crate::types::RowValues;
