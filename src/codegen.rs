//! Rust type declarations generated from introspected metadata.
//!
//! Each relation yields three structs: `<Name>` for selected rows, `New<Name>` for
//! inserts (columns the database can fill in are optional) and `<Name>Update` with every
//! column optional. The output starts with a two-line header (warning and timestamp)
//! which change detection ignores.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FirebirdDbError;
use crate::introspection::{ColumnMetadata, FieldType, FirebirdIntrospector, TableMetadata};

const WARNING_COMMENT: &str =
    "// This file was generated automatically. Please don't edit it manually!";
const HEADER_LINES: usize = 2;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

/// Which relations to generate types for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorTarget {
    #[default]
    Tables,
    Views,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub target: GeneratorTarget,
    /// Only these relations, matched by trimmed catalog name.
    pub tables: Option<Vec<String>>,
    pub file_path: PathBuf,
    /// Also write the metadata as JSON to `metadata_file_path`.
    pub metadata: bool,
    pub metadata_file_path: PathBuf,
    /// Leave the file alone when nothing but the header would change.
    pub check_diff: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            target: GeneratorTarget::default(),
            tables: None,
            file_path: PathBuf::from("types.rs"),
            metadata: false,
            metadata_file_path: PathBuf::from("tables.json"),
            check_diff: false,
        }
    }
}

impl GeneratorOptions {
    #[must_use]
    pub fn with_target(mut self, target: GeneratorTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    #[must_use]
    pub fn with_metadata_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata = true;
        self.metadata_file_path = path.into();
        self
    }

    #[must_use]
    pub fn with_check_diff(mut self, check_diff: bool) -> Self {
        self.check_diff = check_diff;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Written,
    Unchanged,
}

/// Rust type for a column as read back from the database.
///
/// # Errors
/// [`FirebirdDbError::GeneratorError`] for type codes with no mapping.
pub fn rust_type(column: &ColumnMetadata) -> Result<&'static str, FirebirdDbError> {
    if column.data_type.is_integer_storage() && column.data_scale.is_some_and(|s| s < 0) {
        return Ok("f64");
    }
    Ok(match column.data_type {
        FieldType::SmallInt => "i16",
        FieldType::Integer => "i32",
        FieldType::Float => "f32",
        FieldType::Date => "NaiveDate",
        FieldType::Time | FieldType::TimeWithTimeZone => "NaiveTime",
        FieldType::Char | FieldType::Varchar => "String",
        FieldType::BigInt => "i64",
        FieldType::Boolean => "bool",
        FieldType::DecFloat16 | FieldType::DecFloat34 | FieldType::DoublePrecision => "f64",
        FieldType::Int128 => "i128",
        FieldType::TimestampWithTimeZone => "DateTime<FixedOffset>",
        FieldType::Timestamp => "NaiveDateTime",
        FieldType::Blob => "Vec<u8>",
        FieldType::Unknown(code) => {
            return Err(FirebirdDbError::GeneratorError(format!(
                "unsupported data type {code} in column {}",
                column.name
            )));
        }
    })
}

/// `PERSON_ADDRESS` -> `PersonAddress`
#[must_use]
pub fn pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn field_name(column: &str) -> String {
    let mut name: String = column
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if RUST_KEYWORDS.contains(&name.as_str()) {
        name.insert_str(0, "r#");
    }
    name
}

fn write_struct(
    out: &mut String,
    doc: &str,
    derives: &str,
    name: &str,
    fields: &[(String, String)],
) {
    let _ = writeln!(out, "/// {doc}");
    let _ = writeln!(out, "#[derive({derives})]");
    let _ = writeln!(out, "pub struct {name} {{");
    for (field, ty) in fields {
        let _ = writeln!(out, "    pub {field}: {ty},");
    }
    out.push_str("}\n");
}

fn render_table(out: &mut String, table: &TableMetadata) -> Result<(), FirebirdDbError> {
    let type_name = pascal_case(&table.name);
    let mut select = Vec::with_capacity(table.columns.len());
    let mut insert = Vec::with_capacity(table.columns.len());
    let mut update = Vec::with_capacity(table.columns.len());

    for column in &table.columns {
        let ty = rust_type(column)?;
        let name = field_name(&column.name);
        select.push((
            name.clone(),
            if column.is_nullable {
                format!("Option<{ty}>")
            } else {
                ty.to_string()
            },
        ));
        let optional_on_insert =
            column.is_nullable || column.has_default_value || column.is_auto_incrementing;
        insert.push((
            name.clone(),
            if optional_on_insert {
                format!("Option<{ty}>")
            } else {
                ty.to_string()
            },
        ));
        update.push((name, format!("Option<{ty}>")));
    }

    let relation = if table.is_view { "view" } else { "table" };
    write_struct(
        out,
        &format!("Row of {relation} `{}`.", table.name),
        "Debug, Clone, PartialEq",
        &type_name,
        &select,
    );
    out.push('\n');
    write_struct(
        out,
        &format!("Insertable row of `{}`.", table.name),
        "Debug, Clone, PartialEq",
        &format!("New{type_name}"),
        &insert,
    );
    out.push('\n');
    write_struct(
        out,
        &format!("Changes to a row of `{}`.", table.name),
        "Debug, Clone, PartialEq, Default",
        &format!("{type_name}Update"),
        &update,
    );
    Ok(())
}

/// Render the full types file.
///
/// # Errors
/// [`FirebirdDbError::GeneratorError`] if a column type has no mapping.
pub fn render(tables: &[TableMetadata], generated_at: DateTime<Utc>) -> Result<String, FirebirdDbError> {
    let mut out = String::new();
    out.push_str(WARNING_COMMENT);
    out.push('\n');
    let _ = writeln!(
        out,
        "// Timestamp: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    out.push('\n');
    out.push_str("#[allow(unused_imports)]\n");
    out.push_str("use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};\n");

    for table in tables {
        out.push('\n');
        render_table(&mut out, table)?;
    }

    out.push_str("\n/// Relations covered by this file.\n");
    out.push_str("pub const TABLES: &[&str] = &[");
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{:?}", table.name);
    }
    out.push_str("];\n");
    Ok(out)
}

/// Whether `new` differs from `existing` past the header lines.
#[must_use]
pub fn has_changed(existing: &str, new: &str) -> bool {
    let existing: Vec<&str> = existing.split('\n').skip(HEADER_LINES).collect();
    let new: Vec<&str> = new.split('\n').skip(HEADER_LINES).collect();
    existing != new
}

async fn write_outputs(
    types: &str,
    tables: &[TableMetadata],
    options: &GeneratorOptions,
) -> Result<(), FirebirdDbError> {
    tokio::fs::write(&options.file_path, types).await?;
    if options.metadata {
        let json = serde_json::to_string_pretty(tables)?;
        tokio::fs::write(&options.metadata_file_path, json).await?;
    }
    Ok(())
}

async fn read_existing(path: &Path) -> Result<Option<String>, FirebirdDbError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Introspect, render and write the types file (plus optional JSON metadata).
///
/// # Errors
/// Introspection failures, unmapped column types, and file system or JSON errors.
pub async fn generate(
    introspector: &FirebirdIntrospector<'_>,
    options: &GeneratorOptions,
) -> Result<GenerateOutcome, FirebirdDbError> {
    let mut tables = match options.target {
        GeneratorTarget::Tables => introspector.get_tables().await?,
        GeneratorTarget::Views => introspector.get_views().await?,
        GeneratorTarget::All => introspector.get_metadata().await?,
    };
    if let Some(wanted) = &options.tables {
        tables.retain(|table| wanted.iter().any(|name| *name == table.name));
    }

    let types = render(&tables, Utc::now())?;

    if options.check_diff {
        match read_existing(&options.file_path).await? {
            Some(existing) if !has_changed(&existing, &types) => {
                tracing::info!(path = %options.file_path.display(), "types have not changed");
                return Ok(GenerateOutcome::Unchanged);
            }
            Some(_) => {
                tracing::warn!(path = %options.file_path.display(), "types have changed, updating types file");
            }
            None => {
                tracing::warn!(path = %options.file_path.display(), "type file not found, creating a new one");
            }
        }
    }

    write_outputs(&types, &tables, options).await?;
    tracing::info!(
        path = %options.file_path.display(),
        relations = tables.len(),
        "types updated successfully"
    );
    Ok(GenerateOutcome::Written)
}
