use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{PgIdentityError, Result};
use crate::sql::Statement;
use crate::traits::{ConnectionFactory, DatabaseConnection};
use crate::types::{QueryResult, Row};

/// Runs statements on one open connection.
///
/// Opened per store operation; the connection is released when the querier
/// is dropped. Every call races the cancellation token.
pub struct Querier<'a> {
    connection: Box<dyn DatabaseConnection + 'a>,
    cancel: &'a CancellationToken,
}

impl<'a> Querier<'a> {
    /// Open a connection from the factory.
    pub async fn open(
        factory: &'a dyn ConnectionFactory,
        cancel: &'a CancellationToken,
    ) -> Result<Querier<'a>> {
        let connection = cancellable(cancel, factory.connect()).await?;
        Ok(Self { connection, cancel })
    }

    /// Run a statement that returns rows.
    pub async fn query(&self, statement: &Statement) -> Result<QueryResult> {
        let (sql, params) = statement.to_positional()?;
        debug!(sql = %sql, params = params.len(), "query");
        let raw = cancellable(self.cancel, self.connection.query(&sql, &params)).await?;
        Ok(QueryResult::from_raw(raw))
    }

    /// Run a statement expected to return at most one row.
    pub async fn query_optional(&self, statement: &Statement) -> Result<Option<Row>> {
        self.query(statement).await?.optional_row()
    }

    /// Run a statement and return the number of affected rows.
    pub async fn execute(&self, statement: &Statement) -> Result<u64> {
        let (sql, params) = statement.to_positional()?;
        debug!(sql = %sql, params = params.len(), "execute");
        cancellable(self.cancel, self.connection.execute(&sql, &params)).await
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(PgIdentityError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PgIdentityError::Cancelled),
        result = operation => result,
    }
}
