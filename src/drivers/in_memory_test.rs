use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PgIdentityError, Result};
use crate::traits::{ConnectionFactory, DatabaseConnection};
use crate::types::{RawQueryResult, SqlValue};

/// A recorded statement execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A scripted response for the next statement.
#[derive(Debug, Clone)]
pub enum TestResponse {
    /// Rows for `query`; `execute` reports the row count.
    Rows(RawQueryResult),
    /// Affected row count for `execute`; `query` sees no rows.
    Affected(u64),
    /// The statement fails with `QueryFailed`.
    Error(String),
}

impl From<RawQueryResult> for TestResponse {
    fn from(result: RawQueryResult) -> Self {
        TestResponse::Rows(result)
    }
}

/// An in-memory database driver for testing.
///
/// Allows configuring expected responses and verifying executed statements.
/// Statements are recorded with their positional SQL and parameters.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use pgidentity::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
///
/// let driver = Arc::new(
///     InMemoryTestDriver::new()
///         .with_affected(1)
///         .with_response(
///             InMemoryTestResponseBuilder::new()
///                 .columns(&["Id", "Name"])
///                 .row(&["1", "admin"])
///                 .build(),
///         ),
/// );
/// ```
pub struct InMemoryTestDriver {
    responses: Mutex<VecDeque<TestResponse>>,
    recorded_queries: Mutex<Vec<RecordedQuery>>,
    connections_opened: AtomicUsize,
    connections_open: AtomicUsize,
}

impl InMemoryTestDriver {
    /// Create a new in-memory test driver with no pre-configured responses.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            recorded_queries: Mutex::new(Vec::new()),
            connections_opened: AtomicUsize::new(0),
            connections_open: AtomicUsize::new(0),
        }
    }

    /// Add a response to be returned by the next statement.
    /// Responses are returned in FIFO order.
    pub fn with_response(self, response: impl Into<TestResponse>) -> Self {
        self.lock_responses().push_back(response.into());
        self
    }

    /// Add multiple responses to be returned by subsequent statements.
    pub fn with_responses(self, responses: impl IntoIterator<Item = TestResponse>) -> Self {
        self.lock_responses().extend(responses);
        self
    }

    /// Queue an affected-row count.
    pub fn with_affected(self, rows: u64) -> Self {
        self.with_response(TestResponse::Affected(rows))
    }

    /// Queue a statement failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.with_response(TestResponse::Error(message.into()))
    }

    /// Get all recorded statements that have been executed.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.lock_recorded().clone()
    }

    /// Get the last recorded statement, if any.
    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.lock_recorded().last().cloned()
    }

    /// Clear all recorded statements.
    pub fn clear_recorded_queries(&self) {
        self.lock_recorded().clear();
    }

    /// Number of connections handed out so far.
    pub fn connections_opened(&self) -> usize {
        self.connections_opened.load(Ordering::SeqCst)
    }

    /// Number of connections not yet dropped.
    pub fn connections_open(&self) -> usize {
        self.connections_open.load(Ordering::SeqCst)
    }

    /// Assert that the last statement matches the expected SQL and parameters.
    pub fn assert_last_query(&self, expected_sql: &str, expected_params: &[SqlValue]) {
        let last = self.last_query().expect("No queries were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
        assert_eq!(
            last.params, expected_params,
            "Parameters mismatch.\nExpected: {:?}\nActual: {:?}",
            expected_params, last.params
        );
    }

    /// Assert that exactly n statements were executed.
    pub fn assert_query_count(&self, expected: usize) {
        let actual = self.lock_recorded().len();
        assert_eq!(
            actual, expected,
            "Query count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }

    fn record(&self, sql: &str, params: &[SqlValue]) -> Option<TestResponse> {
        self.lock_recorded().push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.lock_responses().pop_front()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<TestResponse>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_recorded(&self) -> std::sync::MutexGuard<'_, Vec<RecordedQuery>> {
        self.recorded_queries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryTestDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionFactory for InMemoryTestDriver {
    async fn connect<'a>(&'a self) -> Result<Box<dyn DatabaseConnection + 'a>> {
        self.connections_opened.fetch_add(1, Ordering::SeqCst);
        self.connections_open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryTestConnection { driver: self }))
    }
}

/// Connection handed out by [`InMemoryTestDriver`].
pub struct InMemoryTestConnection<'a> {
    driver: &'a InMemoryTestDriver,
}

impl Drop for InMemoryTestConnection<'_> {
    fn drop(&mut self) {
        self.driver.connections_open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<'a> DatabaseConnection for InMemoryTestConnection<'a> {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        match self.driver.record(sql, params) {
            Some(TestResponse::Rows(result)) => Ok(result),
            Some(TestResponse::Error(message)) => Err(PgIdentityError::QueryFailed(message)),
            Some(TestResponse::Affected(_)) | None => Ok(RawQueryResult::empty()),
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        match self.driver.record(sql, params) {
            Some(TestResponse::Affected(rows)) => Ok(rows),
            Some(TestResponse::Rows(result)) => Ok(result.rows.len() as u64),
            Some(TestResponse::Error(message)) => Err(PgIdentityError::QueryFailed(message)),
            None => Ok(0),
        }
    }
}

/// Builder for creating test responses easily.
pub struct InMemoryTestResponseBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl InMemoryTestResponseBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the column names for the response.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a row of non-null string values.
    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows
            .push(values.iter().map(|s| Some(s.to_string())).collect());
        self
    }

    /// Add a row that may contain NULLs.
    pub fn nullable_row(mut self, values: &[Option<&str>]) -> Self {
        self.rows
            .push(values.iter().map(|v| v.map(str::to_string)).collect());
        self
    }

    /// Build the RawQueryResult.
    pub fn build(self) -> RawQueryResult {
        RawQueryResult::new(self.columns, self.rows)
    }
}

impl Default for InMemoryTestResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
