use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row returned by the native Firebird driver.
///
/// Column names are shared across every row of one result, together with a name → index
/// lookup table built once per result.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    column_index: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Create a new database row, building a fresh column lookup table.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            rows,
            column_index,
        }
    }

    /// Build a row from `(column, value)` pairs, the shape most callback drivers hand back.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, RowValues)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<RowValues>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self::new(Arc::new(names), values)
    }

    /// Build sibling rows that share one column list and lookup table.
    #[must_use]
    pub fn batch(column_names: Arc<Vec<String>>, rows: Vec<Vec<RowValues>>) -> Vec<Self> {
        let column_index = Arc::new(index_columns(&column_names));
        rows.into_iter()
            .map(|values| Self {
                column_names: Arc::clone(&column_names),
                rows: values,
                column_index: Arc::clone(&column_index),
            })
            .collect()
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Text value with trailing pad spaces removed.
    ///
    /// Firebird returns `CHAR(n)` columns (all catalog names among them) blank-padded.
    #[must_use]
    pub fn get_trimmed_text(&self, column_name: &str) -> Option<&str> {
        self.get(column_name)
            .and_then(RowValues::as_text)
            .map(str::trim_end)
    }

    /// Integer value, treating NULL and a missing column alike.
    #[must_use]
    pub fn get_int(&self, column_name: &str) -> Option<i64> {
        self.get(column_name).and_then(RowValues::as_int).copied()
    }

    /// `true` when the column is absent or NULL.
    #[must_use]
    pub fn is_null(&self, column_name: &str) -> bool {
        self.get(column_name).is_none_or(RowValues::is_null)
    }
}

fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_blank_padded_catalog_names() {
        let row = CustomDbRow::from_pairs([
            ("RDB$RELATION_NAME", RowValues::from("PERSON                         ")),
            ("RDB$NULL_FLAG", RowValues::Null),
        ]);
        assert_eq!(row.get_trimmed_text("RDB$RELATION_NAME"), Some("PERSON"));
        assert!(row.is_null("RDB$NULL_FLAG"));
        assert!(row.is_null("MISSING"));
        assert_eq!(row.get_int("RDB$NULL_FLAG"), None);
    }

    #[test]
    fn batch_rows_share_columns() {
        let names = Arc::new(vec!["ID".to_string(), "NAME".to_string()]);
        let rows = CustomDbRow::batch(
            Arc::clone(&names),
            vec![
                vec![RowValues::Int(1), RowValues::from("a")],
                vec![RowValues::Int(2), RowValues::from("b")],
            ],
        );
        assert_eq!(rows.len(), 2);
        assert!(Arc::ptr_eq(&rows[0].column_names, &rows[1].column_names));
        assert_eq!(rows[1].get("NAME"), Some(&RowValues::from("b")));
        assert_eq!(rows[0].get_by_index(0), Some(&RowValues::Int(1)));
    }
}
