/// A reference to a column, used internally by query builders.
/// The table part is usually an alias such as `u` in `Users u`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Returns `table.column`, or just `column` when unqualified.
    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(column: &str) -> Self {
        ColumnRef::new(column)
    }
}

impl From<String> for ColumnRef {
    fn from(column: String) -> Self {
        ColumnRef::new(column)
    }
}
