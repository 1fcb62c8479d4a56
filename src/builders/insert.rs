use crate::sql::{columns_block, parameters_block};

/// Builds `INSERT INTO table (columns) VALUES (@properties)`.
///
/// Each column is paired with the property whose parameter supplies it, so
/// column and parameter blocks always line up.
pub struct Insert {
    table: String,
    columns: Vec<String>,
    properties: Vec<String>,
    returning: Option<String>,
    multiline: bool,
}

impl Insert {
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            properties: Vec::new(),
            returning: None,
            multiline: false,
        }
    }

    /// Add a column written from `@property`.
    pub fn value(mut self, column: impl Into<String>, property: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self.properties.push(property.into());
        self
    }

    /// Add several column/property pairs.
    pub fn values<I, C, P>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        for (column, property) in pairs {
            self = self.value(column, property);
        }
        self
    }

    /// Append `RETURNING column`.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = Some(column.into());
        self
    }

    /// Lay the column and parameter blocks out one entry per line.
    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    pub fn build_sql(&self) -> String {
        let separator = if self.multiline { "\n" } else { " " };
        let mut sql = format!(
            "INSERT INTO {}{}{}{}VALUES{}{}",
            self.table,
            separator,
            columns_block(&self.columns, self.multiline),
            separator,
            separator,
            parameters_block(&self.properties, self.multiline),
        );
        if let Some(ref returning) = self.returning {
            sql.push_str(separator);
            sql.push_str("RETURNING ");
            sql.push_str(returning);
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_insert() {
        let sql = Insert::into("Roles")
            .value("Id", "Id")
            .value("Name", "Name")
            .build_sql();
        assert_eq!(sql, "INSERT INTO Roles (Id, Name) VALUES (@Id, @Name)");
    }

    #[test]
    fn test_build_insert_with_renamed_columns_and_returning() {
        let sql = Insert::into("roles")
            .values([("name", "Name"), ("normalized_name", "NormalizedName")])
            .returning("id")
            .build_sql();
        assert_eq!(
            sql,
            "INSERT INTO roles (name, normalized_name) VALUES (@Name, @NormalizedName) RETURNING id"
        );
    }

    #[test]
    fn test_build_insert_multiline() {
        let sql = Insert::into("Roles")
            .values([("Id", "Id"), ("Name", "Name")])
            .multiline(true)
            .build_sql();
        assert_eq!(
            sql,
            "INSERT INTO Roles\n(\n    Id,\n    Name\n)\nVALUES\n(\n    @Id,\n    @Name\n)"
        );
    }
}
