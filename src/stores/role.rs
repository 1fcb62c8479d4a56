use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use super::user::bind_all;
use super::{extra_read_columns, read_extras, read_key, StoreContext};
use crate::builders::{Delete, Insert, Select, Update};
use crate::clauses::WhereClause;
use crate::error::Result;
use crate::identity::{Claim, EntityKind, FailureReason, IdentityResult, IdentityRole};
use crate::naming::Name;
use crate::sql::Statement;
use crate::traits::{StoreKey, TableDescriptor};
use crate::types::{Row, SqlValue};

/// Persists roles and their claims.
pub struct RoleStore<K> {
    ctx: StoreContext,
    _key: PhantomData<fn() -> K>,
}

impl<K> Clone for RoleStore<K> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            _key: PhantomData,
        }
    }
}

impl<K: StoreKey> RoleStore<K> {
    pub(crate) fn new(ctx: StoreContext) -> Self {
        Self {
            ctx,
            _key: PhantomData,
        }
    }

    /// Insert a new role. Keys follow the same rules as [`crate::UserStore::create`].
    #[instrument(skip_all, fields(role = ?role.name))]
    pub async fn create(
        &self,
        role: &mut IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        let options = self.ctx.options();
        let t = &options.tables.roles;

        if role.id.is_unset() {
            if let Some(id) = K::generate() {
                role.id = id;
            }
        }
        let database_key = role.id.is_unset();

        let mut insert = Insert::into(self.ctx.table(t)).multiline(options.multiline_sql);
        let mut params: Vec<(String, SqlValue)> = Vec::new();
        if !database_key {
            insert = insert.value(self.ctx.ident(&t.id), "Id");
            params.push(("Id".to_string(), role.id.to_sql_value()));
        }
        for (property, value) in role.property_values() {
            insert = insert.value(self.ctx.column_for(t, property)?, property);
            params.push((property.to_string(), value));
        }
        for (column, property) in self.ctx.extra_write_columns(t, &options.role_insert_properties)? {
            let value = role.extra.get(&property).cloned().unwrap_or(SqlValue::Null);
            insert = insert.value(column, property.clone());
            params.push((property, value));
        }
        if database_key {
            insert = insert.returning(self.ctx.ident(&t.id));
        }

        let statement = bind_all(Statement::new(insert.build_sql()), params);
        let reason = FailureReason::InsertFailed {
            entity: EntityKind::Role,
            name: role.display_name(),
        };
        let querier = self.ctx.open(cancel).await?;

        if database_key {
            return match querier.query_optional(&statement).await? {
                Some(row) => {
                    role.id = read_key(&row, &t.id)?;
                    Ok(IdentityResult::Success)
                }
                None => Ok(self.ctx.failure(reason)),
            };
        }
        let affected = querier.execute(&statement).await?;
        Ok(self.ctx.mutation_result(affected, reason))
    }

    /// Write every column of an existing role and rotate its concurrency stamp.
    #[instrument(skip_all, fields(role = ?role.name))]
    pub async fn update(
        &self,
        role: &mut IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        let options = self.ctx.options();
        let t = &options.tables.roles;
        role.concurrency_stamp = Some(Uuid::new_v4().to_string());

        let mut update = Update::table(self.ctx.table(t)).multiline(options.multiline_sql);
        let mut params: Vec<(String, SqlValue)> = vec![("Id".to_string(), role.id.to_sql_value())];
        for (property, value) in role.property_values() {
            update = update.set(&self.ctx.column_for(t, property)?, property);
            params.push((property.to_string(), value));
        }
        for (column, property) in self.ctx.extra_write_columns(t, &options.role_update_properties)? {
            let value = role.extra.get(&property).cloned().unwrap_or(SqlValue::Null);
            update = update.set(&column, &property);
            params.push((property, value));
        }
        update = update.where_(WhereClause::eq(self.ctx.ident(&t.id), "Id"));

        let statement = bind_all(Statement::new(update.build_sql()), params);
        let affected = self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(self.ctx.mutation_result(
            affected,
            FailureReason::UpdateFailed {
                entity: EntityKind::Role,
                name: role.display_name(),
            },
        ))
    }

    /// Delete a role. Deleting a role that does not exist is a failure.
    #[instrument(skip_all, fields(role = ?role.name))]
    pub async fn delete(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        let t = &self.ctx.options().tables.roles;
        let sql = Delete::from(self.ctx.table(t), WhereClause::eq(self.ctx.ident(&t.id), "Id"))
            .build_sql();
        let statement = Statement::new(sql).bind("Id", role.id.to_sql_value());

        let affected = self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(self.ctx.mutation_result(
            affected,
            FailureReason::DeleteFailed {
                entity: EntityKind::Role,
                name: role.display_name(),
            },
        ))
    }

    #[instrument(skip_all, fields(id = ?id))]
    pub async fn find_by_id(
        &self,
        id: &K,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityRole<K>>> {
        let t = &self.ctx.options().tables.roles;
        self.find_one(&t.id, "Id", id.to_sql_value(), cancel).await
    }

    #[instrument(skip_all, fields(role = normalized_name))]
    pub async fn find_by_name(
        &self,
        normalized_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityRole<K>>> {
        let t = &self.ctx.options().tables.roles;
        self.find_one(
            &t.normalized_name,
            "NormalizedName",
            normalized_name.into(),
            cancel,
        )
        .await
    }

    /// Every role in the store.
    #[instrument(skip_all)]
    pub async fn roles(&self, cancel: &CancellationToken) -> Result<Vec<IdentityRole<K>>> {
        let t = &self.ctx.options().tables.roles;
        let sql = Select::columns(self.role_columns())
            .from(self.ctx.table(t))
            .build_sql();

        let result = self.ctx.open(cancel).await?.query(&Statement::new(sql)).await?;
        result.rows_ref().iter().map(|row| self.read_role(row)).collect()
    }

    #[instrument(skip_all, fields(role = ?role.id))]
    pub async fn get_claims(
        &self,
        role: &IdentityRole<K>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Claim>> {
        let t = &self.ctx.options().tables.role_claims;
        let sql = Select::columns([self.ctx.ident(&t.claim_type), self.ctx.ident(&t.claim_value)])
            .from(self.ctx.table(t))
            .where_(WhereClause::eq(self.ctx.ident(&t.role_id), "RoleId"))
            .build_sql();
        let statement = Statement::new(sql).bind("RoleId", role.id.to_sql_value());

        let result = self.ctx.open(cancel).await?.query(&statement).await?;
        result
            .rows_ref()
            .iter()
            .map(|row| -> Result<Claim> {
                Ok(Claim::new(
                    row.get_string(t.claim_type.as_str())?.unwrap_or_default(),
                    row.get_string(t.claim_value.as_str())?.unwrap_or_default(),
                ))
            })
            .collect()
    }

    #[instrument(skip_all, fields(role = ?role.id, claim_type = %claim.claim_type))]
    pub async fn add_claim(
        &self,
        role: &IdentityRole<K>,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.role_claims;
        let sql = Insert::into(self.ctx.table(t))
            .value(self.ctx.ident(&t.role_id), "RoleId")
            .value(self.ctx.ident(&t.claim_type), "ClaimType")
            .value(self.ctx.ident(&t.claim_value), "ClaimValue")
            .build_sql();
        let statement = self.bind_claim(Statement::new(sql), role, claim);

        self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(role = ?role.id, claim_type = %claim.claim_type))]
    pub async fn remove_claim(
        &self,
        role: &IdentityRole<K>,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.role_claims;
        let filter = WhereClause::eq(self.ctx.ident(&t.role_id), "RoleId")
            .and(WhereClause::eq(self.ctx.ident(&t.claim_type), "ClaimType"))
            .and(WhereClause::eq(self.ctx.ident(&t.claim_value), "ClaimValue"));
        let sql = Delete::from(self.ctx.table(t), filter).build_sql();
        let statement = self.bind_claim(Statement::new(sql), role, claim);

        self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(())
    }

    fn role_columns(&self) -> Vec<String> {
        let options = self.ctx.options();
        let mut columns: Vec<String> = options
            .tables
            .roles
            .columns()
            .into_iter()
            .map(|name| self.ctx.ident(name))
            .collect();
        for (column, _) in self.extra_columns() {
            columns.push(options.identifier(&column));
        }
        columns
    }

    fn extra_columns(&self) -> Vec<(String, String)> {
        let options = self.ctx.options();
        extra_read_columns(
            options,
            &options.role_insert_properties,
            &options.role_update_properties,
        )
    }

    fn read_role(&self, row: &Row) -> Result<IdentityRole<K>> {
        let t = &self.ctx.options().tables.roles;
        Ok(IdentityRole {
            id: read_key(row, &t.id)?,
            name: row.get_string(t.name.as_str())?,
            normalized_name: row.get_string(t.normalized_name.as_str())?,
            concurrency_stamp: row.get_string(t.concurrency_stamp.as_str())?,
            extra: read_extras(row, &self.extra_columns())?,
        })
    }

    async fn find_one(
        &self,
        column: &Name,
        param: &str,
        value: SqlValue,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityRole<K>>> {
        let t = &self.ctx.options().tables.roles;
        let sql = Select::columns(self.role_columns())
            .from(self.ctx.table(t))
            .where_(WhereClause::eq(self.ctx.ident(column), param))
            .build_sql();
        let statement = Statement::new(sql).bind(param, value);

        let row = self.ctx.open(cancel).await?.query_optional(&statement).await?;
        row.map(|row| self.read_role(&row)).transpose()
    }

    fn bind_claim(&self, statement: Statement, role: &IdentityRole<K>, claim: &Claim) -> Statement {
        statement
            .bind("RoleId", role.id.to_sql_value())
            .bind("ClaimType", claim.claim_type.as_str())
            .bind("ClaimValue", claim.value.as_str())
    }
}
