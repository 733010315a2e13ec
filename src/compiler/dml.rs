use super::{Renderer, identifiers};
use crate::ast::{
    DeleteQueryNode, InsertQueryNode, InsertValues, NodeKind, OperationNode, UpdateQueryNode,
};
use crate::error::FirebirdDbError;

impl Renderer {
    pub(super) fn visit_insert(&mut self, node: &InsertQueryNode) -> Result<(), FirebirdDbError> {
        if node.top.is_some() {
            return Err(FirebirdDbError::Unsupported("TOP"));
        }
        if node.on_conflict.is_some() {
            return Err(FirebirdDbError::Unsupported("ON CONFLICT"));
        }

        self.append("insert into ");
        self.append(&identifiers::qualified_table(&node.into));

        if !node.columns.is_empty() {
            let names: Vec<String> = node
                .columns
                .iter()
                .map(|c| identifiers::quote_identifier(&c.name))
                .collect();
            self.append(" (");
            self.append(&names.join(", "));
            self.append(")");
        }

        match &node.values {
            InsertValues::Rows(rows) => {
                if rows.is_empty() {
                    return Err(FirebirdDbError::CompileError(
                        "insert requires at least one row of values".into(),
                    ));
                }
                self.append(" values ");
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        self.append(", ");
                    }
                    self.append("(");
                    self.visit_list(row, ", ")?;
                    self.append(")");
                }
            }
            InsertValues::Select(select) => {
                self.append(" ");
                let parent = self.parent();
                self.within(NodeKind::SelectQuery, |r| r.visit_select(select, parent))?;
            }
            InsertValues::Defaults => self.append(" default values"),
        }

        self.visit_returning(&node.returning)
    }

    pub(super) fn visit_update(&mut self, node: &UpdateQueryNode) -> Result<(), FirebirdDbError> {
        if node.top.is_some() {
            return Err(FirebirdDbError::Unsupported("TOP"));
        }
        if node.updates.is_empty() {
            return Err(FirebirdDbError::CompileError(
                "update requires at least one column assignment".into(),
            ));
        }

        self.append("update ");
        self.visit(&node.table)?;
        self.append(" set ");
        self.within(NodeKind::ColumnUpdate, |r| {
            for (i, update) in node.updates.iter().enumerate() {
                if i > 0 {
                    r.append(", ");
                }
                r.append_identifier(&update.column.name);
                r.append(" = ");
                r.visit(&update.value)?;
            }
            Ok(())
        })?;

        if let Some(predicate) = &node.where_clause {
            self.append(" where ");
            self.within(NodeKind::Where, |r| r.visit(predicate))?;
        }

        self.visit_returning(&node.returning)
    }

    pub(super) fn visit_delete(&mut self, node: &DeleteQueryNode) -> Result<(), FirebirdDbError> {
        if node.top.is_some() {
            return Err(FirebirdDbError::Unsupported("TOP"));
        }

        self.append("delete from ");
        self.visit(&node.from)?;

        if let Some(predicate) = &node.where_clause {
            self.append(" where ");
            self.within(NodeKind::Where, |r| r.visit(predicate))?;
        }

        self.visit_returning(&node.returning)
    }

    fn visit_returning(&mut self, returning: &[OperationNode]) -> Result<(), FirebirdDbError> {
        if returning.is_empty() {
            return Ok(());
        }
        self.append(" returning ");
        self.within(NodeKind::Returning, |r| r.visit_list(returning, ", "))
    }
}
