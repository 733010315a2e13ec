use super::{ColumnNode, OperationNode, SelectQueryNode, TableNode};

/// Column data types the compiler can spell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    SmallInt,
    Integer,
    BigInt,
    Int128,
    Float,
    DoublePrecision,
    DecFloat(Option<u8>),
    Numeric(u8, u8),
    Decimal(u8, u8),
    Char(u32),
    Varchar(u32),
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampWithTimeZone,
    Blob,
    BlobText,
    /// Anything else, written verbatim.
    Custom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferencesNode {
    pub table: TableNode,
    pub columns: Vec<ColumnNode>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinitionNode {
    pub column: ColumnNode,
    pub data_type: DataType,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub not_null: bool,
    pub default_value: Option<OperationNode>,
    pub check: Option<OperationNode>,
    pub references: Option<ReferencesNode>,
}

impl ColumnDefinitionNode {
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            column: ColumnNode { name: name.into() },
            data_type,
            auto_increment: false,
            primary_key: false,
            unique: false,
            not_null: false,
            default_value: None,
            check: None,
            references: None,
        }
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn default_to(mut self, value: OperationNode) -> Self {
        self.default_value = Some(value);
        self
    }

    #[must_use]
    pub fn references(mut self, table: TableNode, column: impl Into<String>) -> Self {
        self.references = Some(ReferencesNode {
            table,
            columns: vec![ColumnNode {
                name: column.into(),
            }],
            on_delete: None,
            on_update: None,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintNode {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<ColumnNode>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<ColumnNode>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<ColumnNode>,
        references: ReferencesNode,
    },
    Check {
        name: Option<String>,
        expression: OperationNode,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableNode {
    pub table: TableNode,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDefinitionNode>,
    pub constraints: Vec<TableConstraintNode>,
}

impl CreateTableNode {
    #[must_use]
    pub fn new(table: TableNode) -> Self {
        Self {
            table,
            if_not_exists: false,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDefinitionNode) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: TableConstraintNode) -> Self {
        self.constraints.push(constraint);
        self
    }
}

impl From<CreateTableNode> for OperationNode {
    fn from(node: CreateTableNode) -> Self {
        OperationNode::CreateTable(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewNode {
    pub name: TableNode,
    /// `create or alter view`
    pub or_alter: bool,
    pub columns: Vec<ColumnNode>,
    pub query: SelectQueryNode,
}

impl From<CreateViewNode> for OperationNode {
    fn from(node: CreateViewNode) -> Self {
        OperationNode::CreateView(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexNode {
    pub name: String,
    pub table: TableNode,
    pub columns: Vec<ColumnNode>,
    pub unique: bool,
    pub descending: bool,
}

impl From<CreateIndexNode> for OperationNode {
    fn from(node: CreateIndexNode) -> Self {
        OperationNode::CreateIndex(Box::new(node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableNode {
    pub table: TableNode,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropViewNode {
    pub name: TableNode,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndexNode {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSchemaNode {
    pub schema: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSchemaNode {
    pub schema: String,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTypeNode {
    pub name: TableNode,
    pub enum_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTypeNode {
    pub name: TableNode,
    pub if_exists: bool,
}
