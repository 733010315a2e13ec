//! Firebird dialect for a structured query builder.
//!
//! Two halves:
//!
//! - [`compiler`] renders [`ast::OperationNode`] trees as Firebird SQL with `?`
//!   placeholders, rejecting constructs Firebird has no spelling for.
//! - [`driver`] and [`connection`] adapt a callback-based, one-call-at-a-time native
//!   client (see [`native`]) into async connections with transaction tracking and
//!   deterministic pool release.
//!
//! ```rust
//! use firebird_middleware::prelude::*;
//!
//! let query = SelectQueryNode::from(table("person"))
//!     .columns(["id", "first_name"])
//!     .order_by(col("id"), Some(OrderDirection::Asc))
//!     .limit(10)
//!     .offset(5);
//! let compiled = FirebirdQueryCompiler::new().compile(&query.into())?;
//! assert_eq!(
//!     compiled.sql,
//!     "select first ? skip ? id, first_name from person order by id asc"
//! );
//! # Ok::<(), FirebirdDbError>(())
//! ```

pub mod adapter;
pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod introspection;
pub mod native;
pub mod prelude;
pub mod results;
pub mod transaction;
pub mod translation;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use compiler::{CompiledQuery, FirebirdQueryCompiler};
pub use config::{FirebirdDialectConfig, FirebirdDialectConfigBuilder};
pub use dialect::FirebirdDialect;
pub use error::FirebirdDbError;
pub use results::{CustomDbRow, ResultSet};
pub use types::RowValues;
