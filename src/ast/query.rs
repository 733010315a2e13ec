use super::{BinaryOperator, ColumnNode, OperationNode, TableNode, binary, col, val};
use crate::types::RowValues;

#[derive(Debug, Clone, PartialEq)]
pub struct LimitNode {
    pub limit: OperationNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OffsetNode {
    pub offset: OperationNode,
}

/// SQL Server style `top`; recognized so it can be rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct TopNode {
    pub expression: OperationNode,
    pub percent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchModifier {
    Only,
    WithTies,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchNode {
    pub row_count: OperationNode,
    pub modifier: FetchModifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    pub join_type: JoinType,
    pub table: OperationNode,
    pub on: Option<OperationNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItemNode {
    pub expression: OperationNode,
    pub direction: Option<OrderDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperationNode {
    pub operator: SetOperator,
    pub all: bool,
    pub expression: OperationNode,
}

/// Row-locking clauses trailing a select.
///
/// Declaration order is rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectModifier {
    ForUpdate,
    WithLock,
    SkipLocked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpressionNode {
    pub name: String,
    pub columns: Vec<ColumnNode>,
    pub expression: OperationNode,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQueryNode {
    pub with: Vec<CommonTableExpressionNode>,
    pub recursive: bool,
    pub distinct: bool,
    pub top: Option<TopNode>,
    pub limit: Option<LimitNode>,
    pub offset: Option<OffsetNode>,
    pub selections: Vec<OperationNode>,
    pub from: Vec<OperationNode>,
    pub joins: Vec<JoinNode>,
    pub where_clause: Option<OperationNode>,
    pub group_by: Vec<OperationNode>,
    pub having: Option<OperationNode>,
    pub set_operations: Vec<SetOperationNode>,
    pub order_by: Vec<OrderByItemNode>,
    pub fetch: Option<FetchNode>,
    pub end_modifiers: Vec<SelectModifier>,
}

impl SelectQueryNode {
    /// `select ... from <table>`
    #[must_use]
    pub fn from(from: OperationNode) -> Self {
        Self {
            from: vec![from],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn select(mut self, selection: OperationNode) -> Self {
        self.selections.push(selection);
        self
    }

    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections.extend(columns.into_iter().map(col));
        self
    }

    #[must_use]
    pub fn select_all(mut self) -> Self {
        self.selections.push(OperationNode::SelectAll(None));
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn join(mut self, join_type: JoinType, table: OperationNode, on: OperationNode) -> Self {
        self.joins.push(JoinNode {
            join_type,
            table,
            on: Some(on),
        });
        self
    }

    /// Adds a predicate, `and`-ing it onto an existing one.
    #[must_use]
    pub fn where_(mut self, predicate: OperationNode) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.where_(binary(col(column), BinaryOperator::Eq, val(value)))
    }

    #[must_use]
    pub fn group_by(mut self, expression: OperationNode) -> Self {
        self.group_by.push(expression);
        self
    }

    #[must_use]
    pub fn having(mut self, predicate: OperationNode) -> Self {
        self.having = Some(predicate);
        self
    }

    #[must_use]
    pub fn order_by(mut self, expression: OperationNode, direction: Option<OrderDirection>) -> Self {
        self.order_by.push(OrderByItemNode {
            expression,
            direction,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl Into<RowValues>) -> Self {
        self.limit = Some(LimitNode { limit: val(limit) });
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: impl Into<RowValues>) -> Self {
        self.offset = Some(OffsetNode {
            offset: val(offset),
        });
        self
    }

    #[must_use]
    pub fn top(mut self, expression: OperationNode) -> Self {
        self.top = Some(TopNode {
            expression,
            percent: false,
        });
        self
    }

    #[must_use]
    pub fn union(mut self, other: SelectQueryNode, all: bool) -> Self {
        self.set_operations.push(SetOperationNode {
            operator: SetOperator::Union,
            all,
            expression: other.into(),
        });
        self
    }

    #[must_use]
    pub fn modifier(mut self, modifier: SelectModifier) -> Self {
        self.end_modifiers.push(modifier);
        self
    }
}

impl From<SelectQueryNode> for OperationNode {
    fn from(node: SelectQueryNode) -> Self {
        OperationNode::SelectQuery(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertValues {
    /// `values (...), (...)`
    Rows(Vec<Vec<OperationNode>>),
    /// `insert into t (...) select ...`
    Select(SelectQueryNode),
    /// `default values`
    Defaults,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflictNode {
    pub columns: Vec<ColumnNode>,
    pub do_nothing: bool,
    pub updates: Vec<ColumnUpdateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertQueryNode {
    pub into: TableNode,
    pub top: Option<TopNode>,
    pub columns: Vec<ColumnNode>,
    pub values: InsertValues,
    pub on_conflict: Option<OnConflictNode>,
    pub returning: Vec<OperationNode>,
}

impl InsertQueryNode {
    #[must_use]
    pub fn into_table(table: TableNode) -> Self {
        Self {
            into: table,
            top: None,
            columns: Vec::new(),
            values: InsertValues::Rows(Vec::new()),
            on_conflict: None,
            returning: Vec::new(),
        }
    }

    /// Appends one row of bound values; the first row also fixes the column list.
    #[must_use]
    pub fn values<I, S, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<RowValues>,
    {
        let (names, values): (Vec<String>, Vec<OperationNode>) = row
            .into_iter()
            .map(|(name, value)| (name.into(), val(value)))
            .unzip();
        if self.columns.is_empty() {
            self.columns = names.into_iter().map(|name| ColumnNode { name }).collect();
        }
        match &mut self.values {
            InsertValues::Rows(rows) => rows.push(values),
            other => *other = InsertValues::Rows(vec![values]),
        }
        self
    }

    #[must_use]
    pub fn returning(mut self, expression: OperationNode) -> Self {
        self.returning.push(expression);
        self
    }
}

impl From<InsertQueryNode> for OperationNode {
    fn from(node: InsertQueryNode) -> Self {
        OperationNode::InsertQuery(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnUpdateNode {
    pub column: ColumnNode,
    pub value: OperationNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQueryNode {
    pub table: OperationNode,
    pub top: Option<TopNode>,
    pub updates: Vec<ColumnUpdateNode>,
    pub where_clause: Option<OperationNode>,
    pub returning: Vec<OperationNode>,
}

impl UpdateQueryNode {
    #[must_use]
    pub fn table(table: OperationNode) -> Self {
        Self {
            table,
            top: None,
            updates: Vec::new(),
            where_clause: None,
            returning: Vec::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.updates.push(ColumnUpdateNode {
            column: ColumnNode {
                name: column.into(),
            },
            value: val(value),
        });
        self
    }

    #[must_use]
    pub fn where_(mut self, predicate: OperationNode) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.where_(binary(col(column), BinaryOperator::Eq, val(value)))
    }
}

impl From<UpdateQueryNode> for OperationNode {
    fn from(node: UpdateQueryNode) -> Self {
        OperationNode::UpdateQuery(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQueryNode {
    pub from: OperationNode,
    pub top: Option<TopNode>,
    pub where_clause: Option<OperationNode>,
    pub returning: Vec<OperationNode>,
}

impl DeleteQueryNode {
    #[must_use]
    pub fn from(from: OperationNode) -> Self {
        Self {
            from,
            top: None,
            where_clause: None,
            returning: Vec::new(),
        }
    }

    #[must_use]
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        let predicate = binary(col(column), BinaryOperator::Eq, val(value));
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }
}

impl From<DeleteQueryNode> for OperationNode {
    fn from(node: DeleteQueryNode) -> Self {
        OperationNode::DeleteQuery(Box::new(node))
    }
}
