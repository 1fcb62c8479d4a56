use crate::clauses::WhereClause;
use crate::traits::ColumnRef;

/// Entry point for building a SELECT query.
/// Must call `.columns()` to proceed.
pub struct Select;

impl Select {
    /// Specify the columns to select.
    pub fn columns<I, C>(cols: I) -> SelectWithColumns
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnRef>,
    {
        SelectWithColumns {
            columns: cols.into_iter().map(Into::into).collect(),
        }
    }
}

/// SELECT builder after columns have been specified.
/// Must call `.from()` to proceed.
pub struct SelectWithColumns {
    columns: Vec<ColumnRef>,
}

impl SelectWithColumns {
    /// Specify the table to select from, optionally followed by an alias.
    pub fn from(self, table: impl Into<String>) -> SelectWithTable {
        SelectWithTable {
            columns: self.columns,
            table: table.into(),
            joins: Vec::new(),
            where_clause: None,
            limit: None,
        }
    }
}

/// SELECT builder after table has been specified.
/// Can optionally add joins, a WHERE clause or a LIMIT.
pub struct SelectWithTable {
    columns: Vec<ColumnRef>,
    table: String,
    joins: Vec<String>,
    where_clause: Option<WhereClause>,
    limit: Option<u64>,
}

impl SelectWithTable {
    /// Add `INNER JOIN table ON left = right`.
    pub fn inner_join(mut self, table: impl Into<String>, left: ColumnRef, right: ColumnRef) -> Self {
        self.joins.push(format!(
            "INNER JOIN {} ON {} = {}",
            table.into(),
            left.qualified_name(),
            right.qualified_name()
        ));
        self
    }

    /// Add a WHERE clause to the query.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Add a LIMIT to the query.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Build the SQL query string.
    pub fn build_sql(&self) -> String {
        let mut sql = String::with_capacity(256);

        // SELECT clause
        sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&col.qualified_name());
        }

        // FROM clause
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        // WHERE clause
        if let Some(ref where_clause) = self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.build_sql());
        }

        // LIMIT clause
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple_select() {
        let sql = Select::columns(["Id", "Name"]).from("Roles").build_sql();
        assert_eq!(sql, "SELECT Id, Name FROM Roles");
    }

    #[test]
    fn test_build_select_with_where() {
        let sql = Select::columns(["Id"])
            .from("Roles")
            .where_(WhereClause::eq("NormalizedName", "NormalizedName"))
            .build_sql();
        assert_eq!(
            sql,
            "SELECT Id FROM Roles WHERE NormalizedName = @NormalizedName"
        );
    }

    #[test]
    fn test_build_select_with_where_and_limit() {
        let sql = Select::columns(["Id"])
            .from("Users")
            .where_(WhereClause::eq("NormalizedEmail", "NormalizedEmail"))
            .limit(1)
            .build_sql();
        assert_eq!(
            sql,
            "SELECT Id FROM Users WHERE NormalizedEmail = @NormalizedEmail LIMIT 1"
        );
    }

    #[test]
    fn test_build_select_with_join() {
        let sql = Select::columns([ColumnRef::qualified("r", "Name")])
            .from("Roles r")
            .inner_join(
                "UserRoles ur",
                ColumnRef::qualified("ur", "RoleId"),
                ColumnRef::qualified("r", "Id"),
            )
            .where_(WhereClause::eq(ColumnRef::qualified("ur", "UserId"), "UserId"))
            .build_sql();
        assert_eq!(
            sql,
            "SELECT r.Name FROM Roles r INNER JOIN UserRoles ur ON ur.RoleId = r.Id WHERE ur.UserId = @UserId"
        );
    }
}
