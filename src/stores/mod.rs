//! User and role stores.

mod role;
mod user;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{PgIdentityError, Result};
use crate::identity::{ErrorDescriber, FailureReason, IdentityResult};
use crate::naming::Name;
use crate::options::{ExtraProperties, IdentityStoreOptions};
use crate::querier::Querier;
use crate::traits::{ColumnRef, ConnectionFactory, StoreKey, TableDescriptor};
use crate::types::{Row, SqlValue};

pub use role::RoleStore;
pub use user::UserStore;

/// Read-only state shared by every store created from one
/// [`crate::IdentityStore`].
#[derive(Clone)]
pub(crate) struct StoreContext {
    factory: Arc<dyn ConnectionFactory>,
    options: Arc<IdentityStoreOptions>,
    describer: Arc<dyn ErrorDescriber>,
}

impl StoreContext {
    pub(crate) fn new(
        factory: Arc<dyn ConnectionFactory>,
        options: Arc<IdentityStoreOptions>,
        describer: Arc<dyn ErrorDescriber>,
    ) -> Self {
        Self {
            factory,
            options,
            describer,
        }
    }

    fn options(&self) -> &IdentityStoreOptions {
        &self.options
    }

    async fn open<'a>(&'a self, cancel: &'a CancellationToken) -> Result<Querier<'a>> {
        Querier::open(self.factory.as_ref(), cancel).await
    }

    /// Rendered table name, schema-qualified and quoted as configured.
    fn table<T: TableDescriptor>(&self, table: &T) -> String {
        self.options.table_identifier(table)
    }

    /// Rendered column name.
    fn ident(&self, name: &Name) -> String {
        self.options.identifier(name.as_str())
    }

    /// Rendered column name qualified with a table alias.
    fn aliased(&self, alias: &str, name: &Name) -> ColumnRef {
        ColumnRef::qualified(alias, self.ident(name))
    }

    /// Rendered column for a canonical property of `table`.
    fn column_for<T: TableDescriptor>(&self, table: &T, property: &str) -> Result<String> {
        table
            .column_for(property)
            .map(|column| self.options.identifier(column))
            .ok_or_else(|| PgIdentityError::ColumnNotFound(property.to_string()))
    }

    /// Rendered `(column, property)` pairs for extra properties written to
    /// `table`. A property that names a built-in column is rejected.
    fn extra_write_columns<T: TableDescriptor>(
        &self,
        table: &T,
        extras: &ExtraProperties,
    ) -> Result<Vec<(String, String)>> {
        let columns = self.options.extra_columns(extras);
        if let Some((_, property)) = columns.iter().find(|(_, p)| is_reserved(table, p)) {
            return Err(PgIdentityError::ReservedProperty(property.clone()));
        }
        Ok(columns)
    }

    /// Turns an affected-row count into an [`IdentityResult`].
    fn mutation_result(&self, affected: u64, reason: FailureReason) -> IdentityResult {
        if affected > 0 {
            return IdentityResult::Success;
        }
        warn!(?reason, "statement affected no rows");
        IdentityResult::failed(self.describer.describe(&reason))
    }

    fn failure(&self, reason: FailureReason) -> IdentityResult {
        self.mutation_result(0, reason)
    }
}

/// Raw `(column, property)` pairs read back for an entity: insert extras
/// first, then update extras not already listed.
fn extra_read_columns(
    options: &IdentityStoreOptions,
    insert: &ExtraProperties,
    update: &ExtraProperties,
) -> Vec<(String, String)> {
    let mut columns = insert.resolve(options.naming_policy());
    for (column, property) in update.resolve(options.naming_policy()) {
        if !columns.iter().any(|(_, p)| *p == property) {
            columns.push((column, property));
        }
    }
    columns
}

fn is_reserved<T: TableDescriptor>(table: &T, property: &str) -> bool {
    table.column_for(property).is_some()
}

/// Reads a non-null key column.
fn read_key<K: StoreKey>(row: &Row, column: &Name) -> Result<K> {
    match row.get(column.as_str())? {
        Some(raw) => K::parse_key(raw),
        None => Err(PgIdentityError::InvalidValue {
            column: column.to_string(),
            value: "NULL".to_string(),
        }),
    }
}

/// Reads extra property values as text.
fn read_extras(
    row: &Row,
    columns: &[(String, String)],
) -> Result<std::collections::BTreeMap<String, SqlValue>> {
    columns
        .iter()
        .map(|(column, property)| -> Result<(String, SqlValue)> {
            Ok((property.clone(), SqlValue::from(row.get_string(column)?)))
        })
        .collect()
}
