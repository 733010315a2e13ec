//! Firebird SQL compiler.
//!
//! Renders [`OperationNode`] trees with the generic SQL grammar, substituting Firebird's
//! own spellings where they differ:
//!
//! - identifiers are written bare (no wrapper characters), embedded `"` doubled
//! - every bound value is a `?` placeholder
//! - `limit`/`offset` become `first`/`skip` right after `select`
//! - auto-increment columns are `generated by default as identity`
//! - case-insensitive like becomes `containing`
//!
//! Constructs Firebird has no equivalent for (`top`, `on conflict`, schemas, user types)
//! fail the whole compilation; no partial text is ever returned.

mod ddl;
mod dml;
mod expr;
pub mod identifiers;
mod select;

use crate::ast::{NodeKind, OperationNode};
use crate::error::FirebirdDbError;
use crate::translation::{NATIVE_PLACEHOLDER, renumber_placeholders};
use crate::types::RowValues;

use identifiers::quote_identifier;

/// SQL text plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub parameters: Vec<RowValues>,
}

impl CompiledQuery {
    #[must_use]
    pub fn new(sql: impl Into<String>, parameters: Vec<RowValues>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}

/// Stateless compiler; one instance can be shared by any number of callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdQueryCompiler;

impl FirebirdQueryCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compile a tree into Firebird SQL.
    ///
    /// # Errors
    /// - [`FirebirdDbError::Unsupported`] for constructs Firebird cannot express
    /// - [`FirebirdDbError::CompileError`] for structurally empty statements
    /// - [`FirebirdDbError::PlaceholderError`] if the text and parameters disagree
    ///   (raw fragments carrying their own markers, for instance)
    pub fn compile(&self, node: &OperationNode) -> Result<CompiledQuery, FirebirdDbError> {
        let mut renderer = Renderer::default();
        renderer.visit(node)?;

        let Renderer {
            sql, parameters, ..
        } = renderer;
        let sql = renumber_placeholders(&sql, parameters.len())?.into_owned();
        Ok(CompiledQuery { sql, parameters })
    }
}

/// Output buffer plus the chain of node kinds above the node being rendered.
#[derive(Debug, Default)]
struct Renderer {
    sql: String,
    parameters: Vec<RowValues>,
    parents: Vec<NodeKind>,
}

impl Renderer {
    fn append(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn append_identifier(&mut self, identifier: &str) {
        self.sql.push_str(&quote_identifier(identifier));
    }

    fn append_parameter(&mut self, value: &RowValues) {
        self.sql.push(NATIVE_PLACEHOLDER);
        self.parameters.push(value.clone());
    }

    fn parent(&self) -> Option<NodeKind> {
        self.parents.last().copied()
    }

    /// Render children with `kind` recorded as their parent.
    fn within<F>(&mut self, kind: NodeKind, render: F) -> Result<(), FirebirdDbError>
    where
        F: FnOnce(&mut Self) -> Result<(), FirebirdDbError>,
    {
        self.parents.push(kind);
        let result = render(self);
        self.parents.pop();
        result
    }

    fn visit(&mut self, node: &OperationNode) -> Result<(), FirebirdDbError> {
        let parent = self.parent();
        self.within(node.kind(), |r| r.dispatch(node, parent))
    }

    fn visit_list(&mut self, nodes: &[OperationNode], separator: &str) -> Result<(), FirebirdDbError> {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.append(separator);
            }
            self.visit(node)?;
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        node: &OperationNode,
        parent: Option<NodeKind>,
    ) -> Result<(), FirebirdDbError> {
        match node {
            OperationNode::SelectQuery(select) => self.visit_select(select, parent),
            OperationNode::InsertQuery(insert) => self.visit_insert(insert),
            OperationNode::UpdateQuery(update) => self.visit_update(update),
            OperationNode::DeleteQuery(delete) => self.visit_delete(delete),
            OperationNode::CreateTable(create) => self.visit_create_table(create),
            OperationNode::CreateView(create) => self.visit_create_view(create),
            OperationNode::CreateIndex(create) => self.visit_create_index(create),
            OperationNode::DropTable(drop) => {
                self.visit_drop("table", &identifiers::qualified_table(&drop.table), drop.if_exists);
                Ok(())
            }
            OperationNode::DropView(drop) => {
                self.visit_drop("view", &identifiers::qualified_table(&drop.name), drop.if_exists);
                Ok(())
            }
            OperationNode::DropIndex(drop) => {
                self.visit_drop("index", &quote_identifier(&drop.name), drop.if_exists);
                Ok(())
            }
            OperationNode::CreateSchema(_) => Err(FirebirdDbError::Unsupported("CREATE SCHEMA")),
            OperationNode::DropSchema(_) => Err(FirebirdDbError::Unsupported("DROP SCHEMA")),
            OperationNode::CreateType(_) => Err(FirebirdDbError::Unsupported("CREATE TYPE")),
            OperationNode::DropType(_) => Err(FirebirdDbError::Unsupported("DROP TYPE")),
            OperationNode::OnConflict(_) => Err(FirebirdDbError::Unsupported("ON CONFLICT")),
            OperationNode::Table(table) => {
                self.append(&identifiers::qualified_table(table));
                Ok(())
            }
            OperationNode::Column(column) => {
                self.append_identifier(&column.name);
                Ok(())
            }
            OperationNode::Reference(reference) => {
                if let Some(table) = &reference.table {
                    self.append(&identifiers::qualified_table(table));
                    self.append(".");
                }
                self.append_identifier(&reference.column.name);
                Ok(())
            }
            OperationNode::SelectAll(table) => {
                if let Some(table) = table {
                    self.append(&identifiers::qualified_table(table));
                    self.append(".");
                }
                self.append("*");
                Ok(())
            }
            OperationNode::Alias(alias) => {
                self.visit(&alias.node)?;
                self.append(" as ");
                self.append_identifier(&alias.alias);
                Ok(())
            }
            OperationNode::Value(value) => self.visit_value(value),
            OperationNode::ValueList(values) => self.visit_value_list(values),
            OperationNode::BinaryOperation(op) => self.visit_binary(op),
            OperationNode::UnaryOperation(op) => self.visit_unary(op),
            OperationNode::And(left, right) => self.visit_logical(left, "and", right),
            OperationNode::Or(left, right) => self.visit_logical(left, "or", right),
            OperationNode::Parens(inner) => {
                self.append("(");
                self.visit(inner)?;
                self.append(")");
                Ok(())
            }
            OperationNode::Function(function) => {
                self.append(&function.name);
                self.append("(");
                self.visit_list(&function.arguments, ", ")?;
                self.append(")");
                Ok(())
            }
            OperationNode::AggregateFunction(aggregate) => self.visit_aggregate(aggregate),
            OperationNode::Raw(raw) => self.visit_raw(raw),
            OperationNode::SetOperation(op) => self.visit_set_operation(op),
        }
    }

    fn visit_drop(&mut self, what: &str, name: &str, if_exists: bool) {
        self.append("drop ");
        self.append(what);
        if if_exists {
            self.append(" if exists");
        }
        self.append(" ");
        self.append(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BinaryOperator, CreateSchemaNode, CreateTypeNode, DropSchemaNode, DropTypeNode,
        InsertQueryNode, OnConflictNode, SelectQueryNode, TableNode, binary, col, raw, table,
        val,
    };

    fn compile(node: impl Into<OperationNode>) -> Result<CompiledQuery, FirebirdDbError> {
        FirebirdQueryCompiler::new().compile(&node.into())
    }

    #[test]
    fn paginates_with_first_and_skip() {
        let query = SelectQueryNode::from(table("person"))
            .columns(["id", "first_name"])
            .order_by(col("id"), Some(crate::ast::OrderDirection::Asc))
            .limit(10)
            .offset(5);
        let compiled = compile(query).unwrap();
        assert_eq!(
            compiled.sql,
            "select first ? skip ? id, first_name from person order by id asc"
        );
        assert_eq!(compiled.parameters, vec![RowValues::Int(10), RowValues::Int(5)]);
    }

    #[test]
    fn rejects_every_unsupported_construct() {
        let top = SelectQueryNode::from(table("person")).select_all().top(val(1));
        assert_eq!(compile(top).unwrap_err().to_string(), "TOP is not supported in Firebird");

        let mut upsert = InsertQueryNode::into_table(TableNode::new("person"))
            .values([("id", RowValues::Int(1))]);
        upsert.on_conflict = Some(OnConflictNode {
            columns: Vec::new(),
            do_nothing: true,
            updates: Vec::new(),
        });
        assert!(matches!(
            compile(upsert),
            Err(FirebirdDbError::Unsupported("ON CONFLICT"))
        ));

        let schema = OperationNode::CreateSchema(CreateSchemaNode {
            schema: "s".into(),
            if_not_exists: false,
        });
        assert!(matches!(
            compile(schema),
            Err(FirebirdDbError::Unsupported("CREATE SCHEMA"))
        ));
        let drop_schema = OperationNode::DropSchema(DropSchemaNode {
            schema: "s".into(),
            if_exists: true,
            cascade: false,
        });
        assert!(matches!(
            compile(drop_schema),
            Err(FirebirdDbError::Unsupported("DROP SCHEMA"))
        ));
        let create_type = OperationNode::CreateType(CreateTypeNode {
            name: TableNode::new("mood"),
            enum_values: vec!["happy".into()],
        });
        assert!(matches!(
            compile(create_type),
            Err(FirebirdDbError::Unsupported("CREATE TYPE"))
        ));
        let drop_type = OperationNode::DropType(DropTypeNode {
            name: TableNode::new("mood"),
            if_exists: false,
        });
        assert!(matches!(
            compile(drop_type),
            Err(FirebirdDbError::Unsupported("DROP TYPE"))
        ));
    }

    #[test]
    fn compiling_twice_is_identical() {
        let query = SelectQueryNode::from(table("person"))
            .select_all()
            .where_(binary(col("first_name"), BinaryOperator::ILike, val("john")))
            .limit(3);
        let node: OperationNode = query.into();
        let compiler = FirebirdQueryCompiler::new();
        assert_eq!(compiler.compile(&node).unwrap(), compiler.compile(&node).unwrap());
    }

    #[test]
    fn raw_markers_must_match_parameters() {
        let query = SelectQueryNode::from(table("person")).select(raw("count(?)"));
        let err = compile(query).unwrap_err();
        assert!(matches!(err, FirebirdDbError::PlaceholderError(_)));
    }
}
