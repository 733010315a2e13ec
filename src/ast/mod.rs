//! Structured, engine-independent query representation.
//!
//! Trees are produced by a query builder and only borrowed by the compiler. The node
//! vocabulary is closed: [`OperationNode`] lists every kind the compiler knows, including
//! the ones Firebird cannot express (which compile to an error rather than SQL).

mod ddl;
mod query;

pub use ddl::{
    ColumnDefinitionNode, CreateIndexNode, CreateSchemaNode, CreateTableNode, CreateTypeNode,
    CreateViewNode, DataType, DropIndexNode, DropSchemaNode, DropTableNode, DropTypeNode,
    DropViewNode, ReferencesNode, TableConstraintNode,
};
pub use query::{
    ColumnUpdateNode, CommonTableExpressionNode, DeleteQueryNode, FetchModifier, FetchNode,
    InsertQueryNode, InsertValues, JoinNode, JoinType, LimitNode, OffsetNode, OnConflictNode,
    OrderByItemNode, OrderDirection, SelectModifier, SelectQueryNode, SetOperationNode,
    SetOperator, TopNode, UpdateQueryNode,
};

use crate::types::RowValues;

/// Every node kind the Firebird compiler understands.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationNode {
    SelectQuery(Box<SelectQueryNode>),
    InsertQuery(Box<InsertQueryNode>),
    UpdateQuery(Box<UpdateQueryNode>),
    DeleteQuery(Box<DeleteQueryNode>),
    CreateTable(Box<CreateTableNode>),
    CreateView(Box<CreateViewNode>),
    CreateIndex(Box<CreateIndexNode>),
    DropTable(DropTableNode),
    DropView(DropViewNode),
    DropIndex(DropIndexNode),
    CreateSchema(CreateSchemaNode),
    DropSchema(DropSchemaNode),
    CreateType(CreateTypeNode),
    DropType(DropTypeNode),
    Table(TableNode),
    Column(ColumnNode),
    Reference(ReferenceNode),
    /// `*` or `table.*`
    SelectAll(Option<TableNode>),
    Alias(Box<AliasNode>),
    Value(ValueNode),
    ValueList(Vec<OperationNode>),
    BinaryOperation(Box<BinaryOperationNode>),
    UnaryOperation(Box<UnaryOperationNode>),
    And(Box<OperationNode>, Box<OperationNode>),
    Or(Box<OperationNode>, Box<OperationNode>),
    Parens(Box<OperationNode>),
    Function(FunctionNode),
    AggregateFunction(Box<AggregateFunctionNode>),
    Raw(RawNode),
    SetOperation(Box<SetOperationNode>),
    OnConflict(Box<OnConflictNode>),
}

/// Discriminant of an [`OperationNode`] or clause struct, tracked by the compiler as the
/// chain of parents above the node being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    SelectQuery,
    InsertQuery,
    UpdateQuery,
    DeleteQuery,
    CreateTable,
    CreateView,
    CreateIndex,
    DropTable,
    DropView,
    DropIndex,
    CreateSchema,
    DropSchema,
    CreateType,
    DropType,
    Table,
    Column,
    Reference,
    SelectAll,
    Alias,
    Value,
    ValueList,
    BinaryOperation,
    UnaryOperation,
    And,
    Or,
    Parens,
    Function,
    AggregateFunction,
    Raw,
    SetOperation,
    OnConflict,
    With,
    CommonTableExpression,
    Limit,
    Offset,
    Fetch,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    ColumnUpdate,
    Returning,
    ColumnDefinition,
    Constraint,
}

impl OperationNode {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::SelectQuery(_) => NodeKind::SelectQuery,
            Self::InsertQuery(_) => NodeKind::InsertQuery,
            Self::UpdateQuery(_) => NodeKind::UpdateQuery,
            Self::DeleteQuery(_) => NodeKind::DeleteQuery,
            Self::CreateTable(_) => NodeKind::CreateTable,
            Self::CreateView(_) => NodeKind::CreateView,
            Self::CreateIndex(_) => NodeKind::CreateIndex,
            Self::DropTable(_) => NodeKind::DropTable,
            Self::DropView(_) => NodeKind::DropView,
            Self::DropIndex(_) => NodeKind::DropIndex,
            Self::CreateSchema(_) => NodeKind::CreateSchema,
            Self::DropSchema(_) => NodeKind::DropSchema,
            Self::CreateType(_) => NodeKind::CreateType,
            Self::DropType(_) => NodeKind::DropType,
            Self::Table(_) => NodeKind::Table,
            Self::Column(_) => NodeKind::Column,
            Self::Reference(_) => NodeKind::Reference,
            Self::SelectAll(_) => NodeKind::SelectAll,
            Self::Alias(_) => NodeKind::Alias,
            Self::Value(_) => NodeKind::Value,
            Self::ValueList(_) => NodeKind::ValueList,
            Self::BinaryOperation(_) => NodeKind::BinaryOperation,
            Self::UnaryOperation(_) => NodeKind::UnaryOperation,
            Self::And(..) => NodeKind::And,
            Self::Or(..) => NodeKind::Or,
            Self::Parens(_) => NodeKind::Parens,
            Self::Function(_) => NodeKind::Function,
            Self::AggregateFunction(_) => NodeKind::AggregateFunction,
            Self::Raw(_) => NodeKind::Raw,
            Self::SetOperation(_) => NodeKind::SetOperation,
            Self::OnConflict(_) => NodeKind::OnConflict,
        }
    }

    /// `self as alias`
    #[must_use]
    pub fn as_alias(self, alias: impl Into<String>) -> Self {
        Self::Alias(Box::new(AliasNode {
            node: self,
            alias: alias.into(),
        }))
    }

    #[must_use]
    pub fn and(self, other: OperationNode) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: OperationNode) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn parens(self) -> Self {
        Self::Parens(Box::new(self))
    }
}

/// Table name, optionally schema qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNode {
    pub schema: Option<String>,
    pub name: String,
}

impl TableNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNode {
    pub name: String,
}

/// `table.column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNode {
    pub table: Option<TableNode>,
    pub column: ColumnNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasNode {
    pub node: OperationNode,
    pub alias: String,
}

/// A value is bound as a parameter unless `immediate`, in which case it is written into
/// the SQL text as a literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub value: RowValues,
    pub immediate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Like,
    NotLike,
    /// Case-insensitive containment; Firebird spells it `containing`.
    ILike,
    NotILike,
    StartingWith,
    In,
    NotIn,
    Is,
    IsNot,
    Plus,
    Minus,
    Multiply,
    Divide,
    Concat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperationNode {
    pub left: OperationNode,
    pub operator: BinaryOperator,
    pub right: OperationNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Exists,
    NotExists,
    Negate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperationNode {
    pub operator: UnaryOperator,
    pub operand: OperationNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: String,
    pub arguments: Vec<OperationNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFunctionNode {
    pub name: String,
    pub arguments: Vec<OperationNode>,
    pub distinct: bool,
}

/// Raw SQL: `fragments` interleaved with `parameters`
/// (`fragments.len() == parameters.len() + 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub fragments: Vec<String>,
    pub parameters: Vec<OperationNode>,
}

/// Bare column.
#[must_use]
pub fn col(name: impl Into<String>) -> OperationNode {
    OperationNode::Column(ColumnNode { name: name.into() })
}

/// `table.column`
#[must_use]
pub fn reference(table: impl Into<String>, column: impl Into<String>) -> OperationNode {
    OperationNode::Reference(ReferenceNode {
        table: Some(TableNode::new(table)),
        column: ColumnNode {
            name: column.into(),
        },
    })
}

#[must_use]
pub fn table(name: impl Into<String>) -> OperationNode {
    OperationNode::Table(TableNode::new(name))
}

/// Bound parameter.
#[must_use]
pub fn val(value: impl Into<RowValues>) -> OperationNode {
    OperationNode::Value(ValueNode {
        value: value.into(),
        immediate: false,
    })
}

/// Literal written into the SQL text.
#[must_use]
pub fn lit(value: impl Into<RowValues>) -> OperationNode {
    OperationNode::Value(ValueNode {
        value: value.into(),
        immediate: true,
    })
}

#[must_use]
pub fn binary(left: OperationNode, operator: BinaryOperator, right: OperationNode) -> OperationNode {
    OperationNode::BinaryOperation(Box::new(BinaryOperationNode {
        left,
        operator,
        right,
    }))
}

#[must_use]
pub fn unary(operator: UnaryOperator, operand: OperationNode) -> OperationNode {
    OperationNode::UnaryOperation(Box::new(UnaryOperationNode { operator, operand }))
}

#[must_use]
pub fn function(name: impl Into<String>, arguments: Vec<OperationNode>) -> OperationNode {
    OperationNode::Function(FunctionNode {
        name: name.into(),
        arguments,
    })
}

#[must_use]
pub fn aggregate(name: impl Into<String>, arguments: Vec<OperationNode>) -> OperationNode {
    OperationNode::AggregateFunction(Box::new(AggregateFunctionNode {
        name: name.into(),
        arguments,
        distinct: false,
    }))
}

/// Raw SQL with no parameters.
#[must_use]
pub fn raw(sql: impl Into<String>) -> OperationNode {
    OperationNode::Raw(RawNode {
        fragments: vec![sql.into()],
        parameters: Vec::new(),
    })
}
