use std::collections::HashMap;

use crate::error::{PgIdentityError, Result};
use crate::types::SqlValue;

/// SQL text with `@Name` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    sql: String,
    params: HashMap<String, SqlValue>,
    rebound: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: HashMap::new(),
            rebound: Vec::new(),
        }
    }

    /// Bind a value to `@name`. Binding the same name twice makes
    /// [`Statement::to_positional`] fail with `DuplicateParameter`.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let name = name.into();
        if self.params.insert(name.clone(), value.into()).is_some() {
            self.rebound.push(name);
        }
        self
    }

    /// Rewrites `@Name` placeholders to `$1`, `$2`, ... in order of first
    /// appearance and returns the matching positional values.
    ///
    /// A name used twice maps to the same position. Text inside single-quoted
    /// literals and double-quoted identifiers is copied through untouched.
    pub fn to_positional(&self) -> Result<(String, Vec<SqlValue>)> {
        if let Some(name) = self.rebound.first() {
            return Err(PgIdentityError::DuplicateParameter(name.clone()));
        }

        let mut sql = String::with_capacity(self.sql.len());
        let mut values: Vec<SqlValue> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut quote: Option<u8> = None;

        let bytes = self.sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            match quote {
                Some(q) if c == q => quote = None,
                None if c == b'\'' || c == b'"' => quote = Some(c),
                _ => {}
            }
            if c == b'@' && quote.is_none() {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_name_byte(bytes[end]) {
                    end += 1;
                }
                if end > start {
                    let name = &self.sql[start..end];
                    let position = match positions.get(name) {
                        Some(p) => *p,
                        None => {
                            let value = self
                                .params
                                .get(name)
                                .ok_or_else(|| PgIdentityError::UnboundParameter(name.to_string()))?;
                            values.push(value.clone());
                            positions.insert(name, values.len());
                            values.len()
                        }
                    };
                    sql.push('$');
                    sql.push_str(&position.to_string());
                    i = end;
                    continue;
                }
            }
            let next = next_char_boundary(&self.sql, i);
            sql.push_str(&self.sql[i..next]);
            i = next;
        }

        Ok((sql, values))
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn next_char_boundary(s: &str, i: usize) -> usize {
    let mut next = i + 1;
    while !s.is_char_boundary(next) {
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_positional_orders_by_first_use() {
        let stmt = Statement::new("UPDATE Roles SET Name = @Name WHERE Id = @Id")
            .bind("Id", 7)
            .bind("Name", "admin");

        let (sql, params) = stmt.to_positional().unwrap();
        assert_eq!(sql, "UPDATE Roles SET Name = $1 WHERE Id = $2");
        assert_eq!(
            params,
            vec![SqlValue::Text("admin".to_string()), SqlValue::Int32(7)]
        );
    }

    #[test]
    fn test_to_positional_reuses_position_for_repeated_name() {
        let stmt = Statement::new("SELECT 1 FROM t WHERE a = @Key OR b = @Key").bind("Key", "k");
        let (sql, params) = stmt.to_positional().unwrap();
        assert_eq!(sql, "SELECT 1 FROM t WHERE a = $1 OR b = $1");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_to_positional_skips_literals() {
        let stmt = Statement::new("SELECT '@x' FROM t WHERE a = @A").bind("A", true);
        let (sql, params) = stmt.to_positional().unwrap();
        assert_eq!(sql, "SELECT '@x' FROM t WHERE a = $1");
        assert_eq!(params, vec![SqlValue::Bool(true)]);
    }

    #[test]
    fn test_to_positional_skips_quoted_identifiers() {
        let stmt = Statement::new("SELECT \"o'k\", \"a@b\" FROM t WHERE Id = @Id").bind("Id", 1);
        let (sql, params) = stmt.to_positional().unwrap();
        assert_eq!(sql, "SELECT \"o'k\", \"a@b\" FROM t WHERE Id = $1");
        assert_eq!(params, vec![SqlValue::Int32(1)]);
    }

    #[test]
    fn test_to_positional_rejects_rebound_parameter() {
        let stmt = Statement::new("UPDATE t SET Name = @Name WHERE Id = @Id")
            .bind("Id", 1)
            .bind("Name", "admin")
            .bind("Name", SqlValue::Null);
        match stmt.to_positional().unwrap_err() {
            PgIdentityError::DuplicateParameter(name) => assert_eq!(name, "Name"),
            other => panic!("Expected DuplicateParameter error, got {other:?}"),
        }
    }

    #[test]
    fn test_to_positional_unbound_parameter() {
        let stmt = Statement::new("DELETE FROM t WHERE Id = @Id");
        match stmt.to_positional().unwrap_err() {
            PgIdentityError::UnboundParameter(name) => assert_eq!(name, "Id"),
            other => panic!("Expected UnboundParameter error, got {other:?}"),
        }
    }
}
