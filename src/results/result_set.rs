use std::sync::Arc;

use super::row::CustomDbRow;

/// A result set from a database query
///
/// `rows_affected` is `None` whenever the native driver does not report a count, which is
/// the case for every call routed through the callback driver's `query`.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// The number of rows affected (for DML statements), when known
    pub rows_affected: Option<usize>,
}

impl ResultSet {
    #[must_use]
    pub fn from_rows(results: Vec<CustomDbRow>) -> Self {
        Self {
            results,
            rows_affected: None,
        }
    }

    /// Column names of the first row, if any row came back.
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.results.first().map(|row| &row.column_names)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = CustomDbRow;
    type IntoIter = std::vec::IntoIter<CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
