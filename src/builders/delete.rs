use crate::clauses::WhereClause;

/// Builds `DELETE FROM table WHERE ...`.
pub struct Delete {
    table: String,
    where_clause: WhereClause,
}

impl Delete {
    /// Deletes always carry a condition; there is no unconditional form.
    pub fn from(table: impl Into<String>, where_clause: WhereClause) -> Self {
        Self {
            table: table.into(),
            where_clause,
        }
    }

    pub fn build_sql(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {}",
            self.table,
            self.where_clause.build_sql()
        )
    }
}
