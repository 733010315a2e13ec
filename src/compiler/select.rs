use super::Renderer;
use crate::ast::{
    CommonTableExpressionNode, FetchModifier, FetchNode, JoinNode, JoinType, NodeKind,
    OrderByItemNode, OrderDirection, SelectModifier, SelectQueryNode, SetOperationNode,
    SetOperator,
};
use crate::error::FirebirdDbError;

/// Parents under which a select is written without surrounding parentheses.
fn renders_bare_select(parent: Option<NodeKind>) -> bool {
    matches!(
        parent,
        None | Some(
            NodeKind::Parens
                | NodeKind::InsertQuery
                | NodeKind::CreateTable
                | NodeKind::CreateView
                | NodeKind::SetOperation
        )
    )
}

impl Renderer {
    pub(super) fn visit_select(
        &mut self,
        node: &SelectQueryNode,
        parent: Option<NodeKind>,
    ) -> Result<(), FirebirdDbError> {
        if node.top.is_some() {
            return Err(FirebirdDbError::Unsupported("TOP"));
        }

        let wrap_in_parens = !renders_bare_select(parent);
        if wrap_in_parens {
            self.append("(");
        }

        if !node.with.is_empty() {
            self.visit_with(&node.with, node.recursive)?;
            self.append(" ");
        }

        self.append("select");

        if let Some(limit) = &node.limit {
            self.append(" first ");
            self.within(NodeKind::Limit, |r| r.visit(&limit.limit))?;
        }

        if let Some(offset) = &node.offset {
            self.append(" skip ");
            self.within(NodeKind::Offset, |r| r.visit(&offset.offset))?;
        }

        if node.distinct {
            self.append(" distinct");
        }

        if !node.selections.is_empty() {
            self.append(" ");
            self.visit_list(&node.selections, ", ")?;
        }

        if !node.from.is_empty() {
            self.append(" from ");
            self.visit_list(&node.from, ", ")?;
        }

        for join in &node.joins {
            self.append(" ");
            self.visit_join(join)?;
        }

        if let Some(predicate) = &node.where_clause {
            self.append(" where ");
            self.within(NodeKind::Where, |r| r.visit(predicate))?;
        }

        if !node.group_by.is_empty() {
            self.append(" group by ");
            self.within(NodeKind::GroupBy, |r| r.visit_list(&node.group_by, ", "))?;
        }

        if let Some(predicate) = &node.having {
            self.append(" having ");
            self.within(NodeKind::Having, |r| r.visit(predicate))?;
        }

        for operation in &node.set_operations {
            self.append(" ");
            self.visit_set_operation(operation)?;
        }

        if !node.order_by.is_empty() {
            self.append(" ");
            self.visit_order_by(&node.order_by)?;
        }

        if let Some(fetch) = &node.fetch {
            self.append(" ");
            self.visit_fetch(fetch)?;
        }

        if !node.end_modifiers.is_empty() {
            let mut modifiers = node.end_modifiers.clone();
            modifiers.sort_unstable();
            modifiers.dedup();
            for modifier in modifiers {
                self.append(" ");
                self.append(match modifier {
                    SelectModifier::ForUpdate => "for update",
                    SelectModifier::WithLock => "with lock",
                    SelectModifier::SkipLocked => "skip locked",
                });
            }
        }

        if wrap_in_parens {
            self.append(")");
        }
        Ok(())
    }

    pub(super) fn visit_with(
        &mut self,
        expressions: &[CommonTableExpressionNode],
        recursive: bool,
    ) -> Result<(), FirebirdDbError> {
        self.append(if recursive { "with recursive " } else { "with " });
        self.within(NodeKind::With, |r| {
            for (i, cte) in expressions.iter().enumerate() {
                if i > 0 {
                    r.append(", ");
                }
                r.append_identifier(&cte.name);
                if !cte.columns.is_empty() {
                    r.append("(");
                    let names: Vec<String> = cte
                        .columns
                        .iter()
                        .map(|c| super::quote_identifier(&c.name))
                        .collect();
                    r.append(&names.join(", "));
                    r.append(")");
                }
                r.append(" as ");
                r.within(NodeKind::CommonTableExpression, |r| r.visit(&cte.expression))?;
            }
            Ok(())
        })
    }

    fn visit_join(&mut self, join: &JoinNode) -> Result<(), FirebirdDbError> {
        self.append(match join.join_type {
            JoinType::Inner => "inner join ",
            JoinType::Left => "left join ",
            JoinType::Right => "right join ",
            JoinType::Full => "full join ",
            JoinType::Cross => "cross join ",
        });
        self.within(NodeKind::Join, |r| {
            r.visit(&join.table)?;
            if let Some(on) = &join.on {
                r.append(" on ");
                r.visit(on)?;
            }
            Ok(())
        })
    }

    pub(super) fn visit_set_operation(
        &mut self,
        operation: &SetOperationNode,
    ) -> Result<(), FirebirdDbError> {
        self.append(match operation.operator {
            SetOperator::Union => "union",
            SetOperator::Intersect => "intersect",
            SetOperator::Except => "except",
        });
        if operation.all {
            self.append(" all");
        }
        self.append(" ");
        self.within(NodeKind::SetOperation, |r| r.visit(&operation.expression))
    }

    fn visit_order_by(&mut self, items: &[OrderByItemNode]) -> Result<(), FirebirdDbError> {
        self.append("order by ");
        self.within(NodeKind::OrderBy, |r| {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    r.append(", ");
                }
                r.visit(&item.expression)?;
                match item.direction {
                    Some(OrderDirection::Asc) => r.append(" asc"),
                    Some(OrderDirection::Desc) => r.append(" desc"),
                    None => {}
                }
            }
            Ok(())
        })
    }

    fn visit_fetch(&mut self, fetch: &FetchNode) -> Result<(), FirebirdDbError> {
        self.append("fetch next ");
        self.within(NodeKind::Fetch, |r| r.visit(&fetch.row_count))?;
        self.append(match fetch.modifier {
            FetchModifier::Only => " rows only",
            FetchModifier::WithTies => " rows with ties",
        });
        Ok(())
    }
}
