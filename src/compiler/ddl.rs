use super::{Renderer, identifiers};
use crate::ast::{
    ColumnDefinitionNode, ColumnNode, CreateIndexNode, CreateTableNode, CreateViewNode, DataType,
    NodeKind, ReferencesNode, TableConstraintNode,
};
use crate::error::FirebirdDbError;

const AUTO_INCREMENT: &str = "generated by default as identity";

fn data_type(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "smallint".into(),
        DataType::Integer => "integer".into(),
        DataType::BigInt => "bigint".into(),
        DataType::Int128 => "int128".into(),
        DataType::Float => "float".into(),
        DataType::DoublePrecision => "double precision".into(),
        DataType::DecFloat(None) => "decfloat".into(),
        DataType::DecFloat(Some(digits)) => format!("decfloat({digits})"),
        DataType::Numeric(precision, scale) => format!("numeric({precision}, {scale})"),
        DataType::Decimal(precision, scale) => format!("decimal({precision}, {scale})"),
        DataType::Char(length) => format!("char({length})"),
        DataType::Varchar(length) => format!("varchar({length})"),
        DataType::Boolean => "boolean".into(),
        DataType::Date => "date".into(),
        DataType::Time => "time".into(),
        DataType::Timestamp => "timestamp".into(),
        DataType::TimestampWithTimeZone => "timestamp with time zone".into(),
        DataType::Blob => "blob".into(),
        DataType::BlobText => "blob sub_type text".into(),
        DataType::Custom(spelling) => spelling.clone(),
    }
}

fn column_list(columns: &[ColumnNode]) -> String {
    columns
        .iter()
        .map(|c| identifiers::quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Renderer {
    pub(super) fn visit_create_table(&mut self, node: &CreateTableNode) -> Result<(), FirebirdDbError> {
        if node.columns.is_empty() {
            return Err(FirebirdDbError::CompileError(format!(
                "create table {} has no columns",
                node.table.name
            )));
        }

        self.append("create table ");
        if node.if_not_exists {
            self.append("if not exists ");
        }
        self.append(&identifiers::qualified_table(&node.table));
        self.append(" (");

        for (i, column) in node.columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.within(NodeKind::ColumnDefinition, |r| r.visit_column_definition(column))?;
        }
        for constraint in &node.constraints {
            self.append(", ");
            self.within(NodeKind::Constraint, |r| r.visit_table_constraint(constraint))?;
        }

        self.append(")");
        Ok(())
    }

    fn visit_column_definition(&mut self, column: &ColumnDefinitionNode) -> Result<(), FirebirdDbError> {
        self.append_identifier(&column.column.name);
        self.append(" ");
        self.append(&data_type(&column.data_type));

        if column.auto_increment {
            self.append(" ");
            self.append(AUTO_INCREMENT);
        }
        if let Some(default_value) = &column.default_value {
            self.append(" default ");
            self.visit(default_value)?;
        }
        if column.not_null {
            self.append(" not null");
        }
        if column.unique {
            self.append(" unique");
        }
        if column.primary_key {
            self.append(" primary key");
        }
        if let Some(references) = &column.references {
            self.append(" ");
            self.visit_references(references);
        }
        if let Some(check) = &column.check {
            self.append(" check (");
            self.visit(check)?;
            self.append(")");
        }
        Ok(())
    }

    fn visit_references(&mut self, references: &ReferencesNode) {
        self.append("references ");
        self.append(&identifiers::qualified_table(&references.table));
        self.append(" (");
        self.append(&column_list(&references.columns));
        self.append(")");
        if let Some(action) = &references.on_delete {
            self.append(" on delete ");
            self.append(action);
        }
        if let Some(action) = &references.on_update {
            self.append(" on update ");
            self.append(action);
        }
    }

    fn constraint_name(&mut self, name: Option<&String>) {
        if let Some(name) = name {
            self.append("constraint ");
            self.append_identifier(name);
            self.append(" ");
        }
    }

    fn visit_table_constraint(
        &mut self,
        constraint: &TableConstraintNode,
    ) -> Result<(), FirebirdDbError> {
        match constraint {
            TableConstraintNode::PrimaryKey { name, columns } => {
                self.constraint_name(name.as_ref());
                self.append("primary key (");
                self.append(&column_list(columns));
                self.append(")");
            }
            TableConstraintNode::Unique { name, columns } => {
                self.constraint_name(name.as_ref());
                self.append("unique (");
                self.append(&column_list(columns));
                self.append(")");
            }
            TableConstraintNode::ForeignKey {
                name,
                columns,
                references,
            } => {
                self.constraint_name(name.as_ref());
                self.append("foreign key (");
                self.append(&column_list(columns));
                self.append(") ");
                self.visit_references(references);
            }
            TableConstraintNode::Check { name, expression } => {
                self.constraint_name(name.as_ref());
                self.append("check (");
                self.visit(expression)?;
                self.append(")");
            }
        }
        Ok(())
    }

    pub(super) fn visit_create_view(&mut self, node: &CreateViewNode) -> Result<(), FirebirdDbError> {
        self.append(if node.or_alter {
            "create or alter view "
        } else {
            "create view "
        });
        self.append(&identifiers::qualified_table(&node.name));
        if !node.columns.is_empty() {
            self.append(" (");
            self.append(&column_list(&node.columns));
            self.append(")");
        }
        self.append(" as ");
        let parent = self.parent();
        self.within(NodeKind::SelectQuery, |r| r.visit_select(&node.query, parent))
    }

    pub(super) fn visit_create_index(&mut self, node: &CreateIndexNode) -> Result<(), FirebirdDbError> {
        if node.columns.is_empty() {
            return Err(FirebirdDbError::CompileError(format!(
                "index {} has no columns",
                node.name
            )));
        }
        self.append("create ");
        if node.unique {
            self.append("unique ");
        }
        if node.descending {
            self.append("descending ");
        }
        self.append("index ");
        self.append_identifier(&node.name);
        self.append(" on ");
        self.append(&identifiers::qualified_table(&node.table));
        self.append(" (");
        self.append(&column_list(&node.columns));
        self.append(")");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{
        ColumnDefinitionNode, ColumnNode, CreateIndexNode, CreateTableNode, CreateViewNode,
        DataType, DropTableNode, OperationNode, SelectQueryNode, TableConstraintNode, TableNode,
        lit, table,
    };
    use crate::compiler::FirebirdQueryCompiler;

    fn sql(node: impl Into<OperationNode>) -> String {
        FirebirdQueryCompiler::new().compile(&node.into()).unwrap().sql
    }

    #[test]
    fn identity_follows_data_type() {
        let create = CreateTableNode::new(TableNode::new("person"))
            .column(
                ColumnDefinitionNode::new("id", DataType::Integer)
                    .auto_increment()
                    .primary_key(),
            )
            .column(ColumnDefinitionNode::new("first_name", DataType::Varchar(255)).not_null())
            .column(
                ColumnDefinitionNode::new("active", DataType::Boolean).default_to(lit(true)),
            )
            .column(
                ColumnDefinitionNode::new("owner_id", DataType::Integer)
                    .references(TableNode::new("owner"), "id"),
            );
        assert_eq!(
            sql(create),
            "create table person (id integer generated by default as identity primary key, \
             first_name varchar(255) not null, active boolean default true, \
             owner_id integer references owner (id))"
        );
    }

    #[test]
    fn named_table_constraints() {
        let create = CreateTableNode::new(TableNode::new("pet"))
            .column(ColumnDefinitionNode::new("name", DataType::Varchar(50)))
            .column(ColumnDefinitionNode::new("species", DataType::Char(10)))
            .constraint(TableConstraintNode::Unique {
                name: Some("pet_name_unique".into()),
                columns: vec![
                    ColumnNode { name: "name".into() },
                    ColumnNode {
                        name: "species".into(),
                    },
                ],
            });
        assert_eq!(
            sql(create),
            "create table pet (name varchar(50), species char(10), \
             constraint pet_name_unique unique (name, species))"
        );
    }

    #[test]
    fn views_indexes_and_drops() {
        let view = CreateViewNode {
            name: TableNode::new("people"),
            or_alter: true,
            columns: Vec::new(),
            query: SelectQueryNode::from(table("person")).select_all(),
        };
        assert_eq!(sql(view), "create or alter view people as select * from person");

        let index = CreateIndexNode {
            name: "person_name_idx".into(),
            table: TableNode::new("person"),
            columns: vec![ColumnNode {
                name: "last_name".into(),
            }],
            unique: true,
            descending: false,
        };
        assert_eq!(
            sql(index),
            "create unique index person_name_idx on person (last_name)"
        );

        let drop = OperationNode::DropTable(DropTableNode {
            table: TableNode::new("person"),
            if_exists: true,
        });
        assert_eq!(sql(drop), "drop table if exists person");
    }
}
