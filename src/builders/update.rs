use crate::clauses::WhereClause;
use crate::sql::to_assignment;

/// Builds `UPDATE table SET column = @Property, ... WHERE ...`.
pub struct Update {
    table: String,
    assignments: Vec<String>,
    where_clause: Option<WhereClause>,
    multiline: bool,
}

impl Update {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            where_clause: None,
            multiline: false,
        }
    }

    /// Add `column = @property` to the SET list.
    pub fn set(mut self, column: &str, property: &str) -> Self {
        self.assignments.push(to_assignment(column, property));
        self
    }

    /// Add several column/property pairs to the SET list.
    pub fn sets<I, C, P>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: AsRef<str>,
        P: AsRef<str>,
    {
        for (column, property) in pairs {
            self = self.set(column.as_ref(), property.as_ref());
        }
        self
    }

    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn build_sql(&self) -> String {
        let mut sql = format!("UPDATE {} SET", self.table);
        if self.multiline {
            sql.push_str("\n    ");
            sql.push_str(&self.assignments.join(",\n    "));
            sql.push('\n');
        } else {
            sql.push(' ');
            sql.push_str(&self.assignments.join(", "));
            sql.push(' ');
        }
        if let Some(ref where_clause) = self.where_clause {
            sql.push_str("WHERE ");
            sql.push_str(&where_clause.build_sql());
        }
        sql.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_update() {
        let sql = Update::table("Roles")
            .set("Name", "Name")
            .set("NormalizedName", "NormalizedName")
            .where_(WhereClause::eq("Id", "Id"))
            .build_sql();
        assert_eq!(
            sql,
            "UPDATE Roles SET Name = @Name, NormalizedName = @NormalizedName WHERE Id = @Id"
        );
    }

    #[test]
    fn test_build_update_multiline() {
        let sql = Update::table("roles")
            .sets([("name", "Name"), ("normalized_name", "NormalizedName")])
            .where_(WhereClause::eq("id", "Id"))
            .multiline(true)
            .build_sql();
        assert_eq!(
            sql,
            "UPDATE roles SET\n    name = @Name,\n    normalized_name = @NormalizedName\nWHERE id = @Id"
        );
    }
}
