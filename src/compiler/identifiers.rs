use crate::ast::TableNode;

/// Firebird identifiers are written bare; no wrapper character on either side.
pub const LEFT_IDENTIFIER_WRAPPER: &str = "";
pub const RIGHT_IDENTIFIER_WRAPPER: &str = "";

/// Escape an identifier: embedded `"` is doubled.
#[must_use]
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier.replace('"', "\"\"")
}

/// Wrap and escape an identifier for output.
#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    format!(
        "{LEFT_IDENTIFIER_WRAPPER}{}{RIGHT_IDENTIFIER_WRAPPER}",
        sanitize_identifier(identifier)
    )
}

/// `schema.name`, or just `name`.
#[must_use]
pub fn qualified_table(table: &TableNode) -> String {
    match &table.schema {
        Some(schema) => format!("{}.{}", quote_identifier(schema), quote_identifier(&table.name)),
        None => quote_identifier(&table.name),
    }
}
