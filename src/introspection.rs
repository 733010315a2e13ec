//! Table and view metadata read from Firebird's `RDB$` system tables.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::ast::{
    BinaryOperator, JoinType, OperationNode, OrderDirection, SelectQueryNode, TableNode, binary,
    col, lit, reference, val,
};
use crate::compiler::FirebirdQueryCompiler;
use crate::connection::DatabaseConnection;
use crate::error::FirebirdDbError;
use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Schema name reported for every relation; Firebird has a single namespace.
pub const DEFAULT_SCHEMA: &str = "default";

/// `RDB$FIELDS.RDB$FIELD_TYPE` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    SmallInt,
    Integer,
    Float,
    Date,
    Time,
    Char,
    BigInt,
    Boolean,
    DecFloat16,
    DecFloat34,
    Int128,
    DoublePrecision,
    TimeWithTimeZone,
    TimestampWithTimeZone,
    Timestamp,
    Varchar,
    Blob,
    Unknown(i64),
}

impl FieldType {
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            7 => Self::SmallInt,
            8 => Self::Integer,
            10 => Self::Float,
            12 => Self::Date,
            13 => Self::Time,
            14 => Self::Char,
            16 => Self::BigInt,
            23 => Self::Boolean,
            24 => Self::DecFloat16,
            25 => Self::DecFloat34,
            26 => Self::Int128,
            27 => Self::DoublePrecision,
            28 => Self::TimeWithTimeZone,
            29 => Self::TimestampWithTimeZone,
            35 => Self::Timestamp,
            37 => Self::Varchar,
            261 => Self::Blob,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::SmallInt => 7,
            Self::Integer => 8,
            Self::Float => 10,
            Self::Date => 12,
            Self::Time => 13,
            Self::Char => 14,
            Self::BigInt => 16,
            Self::Boolean => 23,
            Self::DecFloat16 => 24,
            Self::DecFloat34 => 25,
            Self::Int128 => 26,
            Self::DoublePrecision => 27,
            Self::TimeWithTimeZone => 28,
            Self::TimestampWithTimeZone => 29,
            Self::Timestamp => 35,
            Self::Varchar => 37,
            Self::Blob => 261,
            Self::Unknown(code) => code,
        }
    }

    /// Integer storage types that become exact numerics when given a negative scale.
    #[must_use]
    pub fn is_integer_storage(self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt | Self::Int128)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallInt => f.write_str("SMALLINT"),
            Self::Integer => f.write_str("INTEGER"),
            Self::Float => f.write_str("FLOAT"),
            Self::Date => f.write_str("DATE"),
            Self::Time => f.write_str("TIME"),
            Self::Char => f.write_str("CHAR"),
            Self::BigInt => f.write_str("BIGINT"),
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::DecFloat16 => f.write_str("DECFLOAT(16)"),
            Self::DecFloat34 => f.write_str("DECFLOAT(34)"),
            Self::Int128 => f.write_str("INT128"),
            Self::DoublePrecision => f.write_str("DOUBLE PRECISION"),
            Self::TimeWithTimeZone => f.write_str("TIME WITH TIME ZONE"),
            Self::TimestampWithTimeZone => f.write_str("TIMESTAMP WITH TIME ZONE"),
            Self::Timestamp => f.write_str("TIMESTAMP"),
            Self::Varchar => f.write_str("VARCHAR"),
            Self::Blob => f.write_str("BLOB"),
            Self::Unknown(code) => write!(f, "{code}"),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: FieldType,
    pub data_length: Option<i64>,
    pub data_precision: Option<i64>,
    pub data_scale: Option<i64>,
    pub is_nullable: bool,
    pub has_default_value: bool,
    pub is_auto_incrementing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub schema: String,
    pub name: String,
    pub is_view: bool,
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMetadata {
    pub name: String,
}

const RELATION_NAME: &str = "RDB$RELATION_NAME";

fn required_text<'r>(row: &'r CustomDbRow, column: &str) -> Result<&'r str, FirebirdDbError> {
    row.get_trimmed_text(column).ok_or_else(|| {
        FirebirdDbError::ConnectionError(format!("catalog row is missing {column}"))
    })
}

fn column_from_row(row: &CustomDbRow) -> Result<ColumnMetadata, FirebirdDbError> {
    let code = row.get_int("RDB$FIELD_TYPE").ok_or_else(|| {
        FirebirdDbError::ConnectionError("catalog row is missing RDB$FIELD_TYPE".into())
    })?;
    Ok(ColumnMetadata {
        name: required_text(row, "RDB$FIELD_NAME")?.to_string(),
        data_type: FieldType::from_code(code),
        data_length: row.get_int("RDB$FIELD_LENGTH"),
        data_precision: row.get_int("RDB$FIELD_PRECISION"),
        data_scale: row.get_int("RDB$FIELD_SCALE"),
        is_nullable: row.get_int("RDB$NULL_FLAG") != Some(1),
        has_default_value: !row.is_null("RDB$DEFAULT_SOURCE"),
        is_auto_incrementing: !row.is_null("RDB$IDENTITY_TYPE"),
    })
}

/// Reads relation metadata over any [`DatabaseConnection`].
pub struct FirebirdIntrospector<'c> {
    connection: &'c dyn DatabaseConnection,
    compiler: FirebirdQueryCompiler,
}

impl<'c> FirebirdIntrospector<'c> {
    #[must_use]
    pub fn new(connection: &'c dyn DatabaseConnection) -> Self {
        Self {
            connection,
            compiler: FirebirdQueryCompiler::new(),
        }
    }

    #[must_use]
    pub fn get_schemas(&self) -> Vec<SchemaMetadata> {
        vec![SchemaMetadata {
            name: DEFAULT_SCHEMA.to_string(),
        }]
    }

    /// User tables (system relations and views excluded).
    ///
    /// # Errors
    /// Any failure running the catalog queries.
    pub async fn get_tables(&self) -> Result<Vec<TableMetadata>, FirebirdDbError> {
        let relations = relations_query().where_(binary(
            col("RDB$SYSTEM_FLAG"),
            BinaryOperator::Eq,
            val(0),
        ));
        let relations = relations.where_(binary(
            col("RDB$VIEW_SOURCE"),
            BinaryOperator::Is,
            lit(RowValues::Null),
        ));
        self.load(relations, false).await
    }

    /// Relations defined by a view source.
    ///
    /// # Errors
    /// Any failure running the catalog queries.
    pub async fn get_views(&self) -> Result<Vec<TableMetadata>, FirebirdDbError> {
        let relations = relations_query().where_(binary(
            col("RDB$VIEW_SOURCE"),
            BinaryOperator::IsNot,
            lit(RowValues::Null),
        ));
        self.load(relations, true).await
    }

    /// Tables followed by views.
    ///
    /// # Errors
    /// Any failure running the catalog queries.
    pub async fn get_metadata(&self) -> Result<Vec<TableMetadata>, FirebirdDbError> {
        let mut tables = self.get_tables().await?;
        tables.extend(self.get_views().await?);
        Ok(tables)
    }

    async fn load(
        &self,
        relations: SelectQueryNode,
        is_view: bool,
    ) -> Result<Vec<TableMetadata>, FirebirdDbError> {
        let relations = self.compiler.compile(&relations.into())?;
        let relation_rows = self.connection.execute_query(&relations).await?;

        let fields = self.compiler.compile(&fields_query().into())?;
        let field_rows = self.connection.execute_query(&fields).await?;

        let mut tables = Vec::with_capacity(relation_rows.len());
        for relation in &relation_rows.results {
            let name = required_text(relation, RELATION_NAME)?;
            let mut columns = Vec::new();
            for field in &field_rows.results {
                if required_text(field, RELATION_NAME)? == name {
                    columns.push(column_from_row(field)?);
                }
            }
            tables.push(TableMetadata {
                schema: DEFAULT_SCHEMA.to_string(),
                name: name.to_string(),
                is_view,
                columns,
            });
        }
        tracing::debug!(relations = tables.len(), is_view, "introspected relations");
        Ok(tables)
    }
}

fn relations_query() -> SelectQueryNode {
    SelectQueryNode::from(OperationNode::Table(TableNode::new("RDB$RELATIONS"))).columns([
        RELATION_NAME,
        "RDB$SYSTEM_FLAG",
        "RDB$VIEW_SOURCE",
    ])
}

fn fields_query() -> SelectQueryNode {
    let mut query = SelectQueryNode::from(
        OperationNode::Table(TableNode::new("RDB$RELATION_FIELDS")).as_alias("rf"),
    );
    for (table, column) in [
        ("rf", RELATION_NAME),
        ("rf", "RDB$FIELD_NAME"),
        ("f", "RDB$FIELD_TYPE"),
        ("f", "RDB$FIELD_LENGTH"),
        ("f", "RDB$FIELD_PRECISION"),
        ("f", "RDB$FIELD_SCALE"),
        ("rf", "RDB$NULL_FLAG"),
        ("rf", "RDB$DEFAULT_SOURCE"),
        ("rf", "RDB$IDENTITY_TYPE"),
    ] {
        query = query.select(reference(table, column));
    }
    query
        .join(
            JoinType::Inner,
            OperationNode::Table(TableNode::new("RDB$FIELDS")).as_alias("f"),
            binary(
                reference("rf", "RDB$FIELD_SOURCE"),
                BinaryOperator::Eq,
                reference("f", "RDB$FIELD_NAME"),
            ),
        )
        .order_by(reference("rf", RELATION_NAME), Some(OrderDirection::Asc))
        .order_by(reference("rf", "RDB$FIELD_POSITION"), Some(OrderDirection::Asc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_queries_render_as_firebird_sql() {
        let compiler = FirebirdQueryCompiler::new();
        let fields = compiler.compile(&fields_query().into()).unwrap();
        assert_eq!(
            fields.sql,
            "select rf.RDB$RELATION_NAME, rf.RDB$FIELD_NAME, f.RDB$FIELD_TYPE, \
             f.RDB$FIELD_LENGTH, f.RDB$FIELD_PRECISION, f.RDB$FIELD_SCALE, rf.RDB$NULL_FLAG, \
             rf.RDB$DEFAULT_SOURCE, rf.RDB$IDENTITY_TYPE from RDB$RELATION_FIELDS as rf \
             inner join RDB$FIELDS as f on rf.RDB$FIELD_SOURCE = f.RDB$FIELD_NAME \
             order by rf.RDB$RELATION_NAME asc, rf.RDB$FIELD_POSITION asc"
        );
        assert!(fields.parameters.is_empty());
    }

    #[test]
    fn column_flags_follow_catalog_conventions() {
        let row = CustomDbRow::from_pairs([
            ("RDB$RELATION_NAME", RowValues::from("PERSON   ")),
            ("RDB$FIELD_NAME", RowValues::from("ID    ")),
            ("RDB$FIELD_TYPE", RowValues::Int(8)),
            ("RDB$FIELD_LENGTH", RowValues::Int(4)),
            ("RDB$FIELD_PRECISION", RowValues::Int(0)),
            ("RDB$FIELD_SCALE", RowValues::Int(0)),
            ("RDB$NULL_FLAG", RowValues::Int(1)),
            ("RDB$DEFAULT_SOURCE", RowValues::Null),
            ("RDB$IDENTITY_TYPE", RowValues::Int(1)),
        ]);
        let column = column_from_row(&row).unwrap();
        assert_eq!(column.name, "ID");
        assert_eq!(column.data_type, FieldType::Integer);
        assert!(!column.is_nullable);
        assert!(!column.has_default_value);
        assert!(column.is_auto_incrementing);
    }

    #[test]
    fn field_types_serialize_by_name() {
        assert_eq!(serde_json::to_string(&FieldType::Varchar).unwrap(), "\"VARCHAR\"");
        assert_eq!(FieldType::from_code(99), FieldType::Unknown(99));
        assert_eq!(FieldType::from_code(261).code(), 261);
    }
}
