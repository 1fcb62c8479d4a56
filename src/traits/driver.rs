use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawQueryResult, SqlValue};

/// Opens database connections on demand.
///
/// Stores call [`ConnectionFactory::connect`] once per operation and drop the
/// returned connection when the operation finishes, on every exit path.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Open a connection. The connection may borrow from the factory.
    async fn connect<'a>(&'a self) -> Result<Box<dyn DatabaseConnection + 'a>>;
}

/// A single open database connection.
/// Connections are responsible for:
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Run a statement that returns rows.
    /// Parameters use PostgreSQL-style placeholders ($1, $2, etc.)
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;
}
