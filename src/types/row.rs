use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::{PgIdentityError, Result};

/// Driver-agnostic raw result from a database query.
/// Non-null values are converted to strings by the driver.
#[derive(Debug, Clone, Default)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order; `None` is SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single row result from a query.
///
/// Values are stored as strings and looked up by column name. Lookups ignore
/// ASCII case because PostgreSQL folds unquoted identifiers to lower case.
#[derive(Debug, Clone)]
pub struct Row {
    values: HashMap<String, Option<String>>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub(crate) fn new(columns: &[String], values: Vec<Option<String>>) -> Self {
        let values = columns
            .iter()
            .zip(values)
            .map(|(col, val)| (col.to_ascii_lowercase(), val))
            .collect();
        Self { values }
    }

    /// Gets a raw value by column name. `Ok(None)` means the column is NULL.
    pub fn get(&self, column: &str) -> Result<Option<&str>> {
        self.values
            .get(&column.to_ascii_lowercase())
            .map(|v| v.as_deref())
            .ok_or_else(|| PgIdentityError::ColumnNotFound(column.to_string()))
    }

    /// Gets a nullable text value.
    pub fn get_string(&self, column: &str) -> Result<Option<String>> {
        Ok(self.get(column)?.map(str::to_string))
    }

    /// Gets a non-null value parsed with `FromStr`.
    pub fn get_parsed<T: FromStr>(&self, column: &str) -> Result<T> {
        match self.get_parsed_opt(column)? {
            Some(v) => Ok(v),
            None => Err(PgIdentityError::InvalidValue {
                column: column.to_string(),
                value: "NULL".to_string(),
            }),
        }
    }

    /// Gets a nullable value parsed with `FromStr`.
    pub fn get_parsed_opt<T: FromStr>(&self, column: &str) -> Result<Option<T>> {
        match self.get(column)? {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| invalid(column, raw)),
        }
    }

    /// Gets a boolean. Accepts both `true`/`false` and PostgreSQL's `t`/`f`.
    /// NULL reads as `false`.
    pub fn get_bool(&self, column: &str) -> Result<bool> {
        match self.get(column)? {
            None => Ok(false),
            Some("true") | Some("t") | Some("1") => Ok(true),
            Some("false") | Some("f") | Some("0") => Ok(false),
            Some(other) => Err(invalid(column, other)),
        }
    }

    /// Gets a nullable RFC 3339 timestamp.
    pub fn get_datetime(&self, column: &str) -> Result<Option<DateTime<Utc>>> {
        match self.get(column)? {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| invalid(column, raw)),
        }
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(|s| s.as_str()).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn invalid(column: &str, value: &str) -> PgIdentityError {
    PgIdentityError::InvalidValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        let rows = raw
            .rows
            .into_iter()
            .map(|values| Row::new(&raw.columns, values))
            .collect();
        Self {
            columns: raw.columns,
            rows,
        }
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        match self.optional_row()? {
            Some(row) => Ok(row),
            None => Err(PgIdentityError::UnexpectedRowCount {
                expected: 1,
                actual: 0,
            }),
        }
    }

    /// Extracts at most one row from the result.
    /// Returns an error if the result contains more than one row.
    pub fn optional_row(self) -> Result<Option<Row>> {
        if self.rows.len() > 1 {
            return Err(PgIdentityError::UnexpectedRowCount {
                expected: 1,
                actual: self.rows.len(),
            });
        }
        Ok(self.rows.into_iter().next())
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
