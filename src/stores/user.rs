use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use super::{extra_read_columns, read_extras, read_key, StoreContext};
use crate::builders::{Delete, Insert, Select, Update};
use crate::clauses::WhereClause;
use crate::error::{PgIdentityError, Result};
use crate::identity::{
    Claim, EntityKind, FailureReason, IdentityResult, IdentityUser, UserLoginInfo,
};
use crate::naming::Name;
use crate::querier::Querier;
use crate::sql::Statement;
use crate::traits::{ColumnRef, StoreKey, TableDescriptor};
use crate::types::{Row, SqlValue};

const USER: &str = "u";
const USER_ROLE: &str = "ur";
const ROLE: &str = "r";
const USER_CLAIM: &str = "uc";
const USER_LOGIN: &str = "ul";

/// Persists users and everything hanging off them: claims, external
/// logins, authentication tokens and role membership.
pub struct UserStore<K> {
    ctx: StoreContext,
    _key: PhantomData<fn() -> K>,
}

impl<K> Clone for UserStore<K> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            _key: PhantomData,
        }
    }
}

impl<K: StoreKey> UserStore<K> {
    pub(crate) fn new(ctx: StoreContext) -> Self {
        Self {
            ctx,
            _key: PhantomData,
        }
    }

    /// Insert a new user.
    ///
    /// String and UUID keys are generated here when unset; integer keys are
    /// assigned by the database and written back into `user.id`.
    #[instrument(skip_all, fields(user = ?user.user_name))]
    pub async fn create(
        &self,
        user: &mut IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        let options = self.ctx.options();
        let t = &options.tables.users;

        if user.id.is_unset() {
            if let Some(id) = K::generate() {
                user.id = id;
            }
        }
        let database_key = user.id.is_unset();

        let mut insert = Insert::into(self.ctx.table(t)).multiline(options.multiline_sql);
        let mut params: Vec<(String, SqlValue)> = Vec::new();
        if !database_key {
            insert = insert.value(self.ctx.ident(&t.id), "Id");
            params.push(("Id".to_string(), user.id.to_sql_value()));
        }
        for (property, value) in user.property_values() {
            insert = insert.value(self.ctx.column_for(t, property)?, property);
            params.push((property.to_string(), value));
        }
        for (column, property) in self.ctx.extra_write_columns(t, &options.user_insert_properties)? {
            let value = user.extra.get(&property).cloned().unwrap_or(SqlValue::Null);
            insert = insert.value(column, property.clone());
            params.push((property, value));
        }
        if database_key {
            insert = insert.returning(self.ctx.ident(&t.id));
        }

        let statement = bind_all(Statement::new(insert.build_sql()), params);
        let reason = FailureReason::InsertFailed {
            entity: EntityKind::User,
            name: user.display_name(),
        };
        let querier = self.ctx.open(cancel).await?;

        if database_key {
            return match querier.query_optional(&statement).await? {
                Some(row) => {
                    user.id = read_key(&row, &t.id)?;
                    Ok(IdentityResult::Success)
                }
                None => Ok(self.ctx.failure(reason)),
            };
        }
        let affected = querier.execute(&statement).await?;
        Ok(self.ctx.mutation_result(affected, reason))
    }

    /// Write every column of an existing user and rotate its concurrency stamp.
    #[instrument(skip_all, fields(user = ?user.user_name))]
    pub async fn update(
        &self,
        user: &mut IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        let options = self.ctx.options();
        let t = &options.tables.users;
        user.concurrency_stamp = Some(Uuid::new_v4().to_string());

        let mut update = Update::table(self.ctx.table(t)).multiline(options.multiline_sql);
        let mut params: Vec<(String, SqlValue)> = vec![("Id".to_string(), user.id.to_sql_value())];
        for (property, value) in user.property_values() {
            update = update.set(&self.ctx.column_for(t, property)?, property);
            params.push((property.to_string(), value));
        }
        for (column, property) in self.ctx.extra_write_columns(t, &options.user_update_properties)? {
            let value = user.extra.get(&property).cloned().unwrap_or(SqlValue::Null);
            update = update.set(&column, &property);
            params.push((property, value));
        }
        update = update.where_(WhereClause::eq(self.ctx.ident(&t.id), "Id"));

        let statement = bind_all(Statement::new(update.build_sql()), params);
        let affected = self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(self.ctx.mutation_result(
            affected,
            FailureReason::UpdateFailed {
                entity: EntityKind::User,
                name: user.display_name(),
            },
        ))
    }

    /// Delete a user. Deleting a user that does not exist is a failure.
    #[instrument(skip_all, fields(user = ?user.user_name))]
    pub async fn delete(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> Result<IdentityResult> {
        let t = &self.ctx.options().tables.users;
        let sql = Delete::from(self.ctx.table(t), WhereClause::eq(self.ctx.ident(&t.id), "Id"))
            .build_sql();
        let statement = Statement::new(sql).bind("Id", user.id.to_sql_value());

        let affected = self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(self.ctx.mutation_result(
            affected,
            FailureReason::DeleteFailed {
                entity: EntityKind::User,
                name: user.display_name(),
            },
        ))
    }

    #[instrument(skip_all, fields(id = ?id))]
    pub async fn find_by_id(
        &self,
        id: &K,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>> {
        let t = &self.ctx.options().tables.users;
        self.find_one(&t.id, "Id", id.to_sql_value(), cancel).await
    }

    #[instrument(skip_all, fields(user_name = normalized_user_name))]
    pub async fn find_by_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>> {
        let t = &self.ctx.options().tables.users;
        self.find_one(
            &t.normalized_user_name,
            "NormalizedUserName",
            normalized_user_name.into(),
            cancel,
        )
        .await
    }

    #[instrument(skip_all, fields(email = normalized_email))]
    pub async fn find_by_email(
        &self,
        normalized_email: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>> {
        let t = &self.ctx.options().tables.users;
        self.find_one(
            &t.normalized_email,
            "NormalizedEmail",
            normalized_email.into(),
            cancel,
        )
        .await
    }

    /// Every user in the store.
    #[instrument(skip_all)]
    pub async fn users(&self, cancel: &CancellationToken) -> Result<Vec<IdentityUser<K>>> {
        let t = &self.ctx.options().tables.users;
        let sql = Select::columns(self.user_columns(USER))
            .from(format!("{} {}", self.ctx.table(t), USER))
            .build_sql();
        self.load_users(&Statement::new(sql), cancel).await
    }

    #[instrument(skip_all, fields(user = ?user.id))]
    pub async fn get_claims(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Claim>> {
        let t = &self.ctx.options().tables.user_claims;
        let sql = Select::columns([self.ctx.ident(&t.claim_type), self.ctx.ident(&t.claim_value)])
            .from(self.ctx.table(t))
            .where_(WhereClause::eq(self.ctx.ident(&t.user_id), "UserId"))
            .build_sql();
        let statement = Statement::new(sql).bind("UserId", user.id.to_sql_value());

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

    #[instrument(skip_all, fields(user = ?user.id, count = claims.len()))]
    pub async fn add_claims(
        &self,
        user: &IdentityUser<K>,
        claims: &[Claim],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_claims;
        let sql = Insert::into(self.ctx.table(t))
            .value(self.ctx.ident(&t.user_id), "UserId")
            .value(self.ctx.ident(&t.claim_type), "ClaimType")
            .value(self.ctx.ident(&t.claim_value), "ClaimValue")
            .build_sql();

        let querier = self.ctx.open(cancel).await?;
        for claim in claims {
            let statement = Statement::new(sql.as_str())
                .bind("UserId", user.id.to_sql_value())
                .bind("ClaimType", claim.claim_type.as_str())
                .bind("ClaimValue", claim.value.as_str());
            querier.execute(&statement).await?;
        }
        Ok(())
    }

    /// Replace every occurrence of `claim` on the user with `new_claim`.
    #[instrument(skip_all, fields(user = ?user.id))]
    pub async fn replace_claim(
        &self,
        user: &IdentityUser<K>,
        claim: &Claim,
        new_claim: &Claim,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_claims;
        let sql = Update::table(self.ctx.table(t))
            .set(&self.ctx.ident(&t.claim_type), "NewClaimType")
            .set(&self.ctx.ident(&t.claim_value), "NewClaimValue")
            .where_(self.claim_filter())
            .build_sql();
        let statement = Statement::new(sql)
            .bind("NewClaimType", new_claim.claim_type.as_str())
            .bind("NewClaimValue", new_claim.value.as_str())
            .bind("UserId", user.id.to_sql_value())
            .bind("ClaimType", claim.claim_type.as_str())
            .bind("ClaimValue", claim.value.as_str());

        self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user = ?user.id, count = claims.len()))]
    pub async fn remove_claims(
        &self,
        user: &IdentityUser<K>,
        claims: &[Claim],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_claims;
        let sql = Delete::from(self.ctx.table(t), self.claim_filter()).build_sql();

        let querier = self.ctx.open(cancel).await?;
        for claim in claims {
            let statement = Statement::new(sql.as_str())
                .bind("UserId", user.id.to_sql_value())
                .bind("ClaimType", claim.claim_type.as_str())
                .bind("ClaimValue", claim.value.as_str());
            querier.execute(&statement).await?;
        }
        Ok(())
    }

    /// Users holding a claim with the given type and value.
    #[instrument(skip_all, fields(claim_type = %claim.claim_type))]
    pub async fn get_users_for_claim(
        &self,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> Result<Vec<IdentityUser<K>>> {
        let options = self.ctx.options();
        let (t, uc) = (&options.tables.users, &options.tables.user_claims);
        let sql = Select::columns(self.user_columns(USER))
            .from(format!("{} {}", self.ctx.table(t), USER))
            .inner_join(
                format!("{} {}", self.ctx.table(uc), USER_CLAIM),
                self.ctx.aliased(USER_CLAIM, &uc.user_id),
                self.ctx.aliased(USER, &t.id),
            )
            .where_(
                WhereClause::eq(self.ctx.aliased(USER_CLAIM, &uc.claim_type), "ClaimType")
                    .and(WhereClause::eq(self.ctx.aliased(USER_CLAIM, &uc.claim_value), "ClaimValue")),
            )
            .build_sql();
        let statement = Statement::new(sql)
            .bind("ClaimType", claim.claim_type.as_str())
            .bind("ClaimValue", claim.value.as_str());
        self.load_users(&statement, cancel).await
    }

    #[instrument(skip_all, fields(user = ?user.id, provider = %login.login_provider))]
    pub async fn add_login(
        &self,
        user: &IdentityUser<K>,
        login: &UserLoginInfo,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_logins;
        let sql = Insert::into(self.ctx.table(t))
            .value(self.ctx.ident(&t.login_provider), "LoginProvider")
            .value(self.ctx.ident(&t.provider_key), "ProviderKey")
            .value(self.ctx.ident(&t.provider_display_name), "ProviderDisplayName")
            .value(self.ctx.ident(&t.user_id), "UserId")
            .build_sql();
        let statement = Statement::new(sql)
            .bind("LoginProvider", login.login_provider.as_str())
            .bind("ProviderKey", login.provider_key.as_str())
            .bind("ProviderDisplayName", login.provider_display_name.clone())
            .bind("UserId", user.id.to_sql_value());

        self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user = ?user.id, provider = login_provider))]
    pub async fn remove_login(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_logins;
        let filter = WhereClause::eq(self.ctx.ident(&t.user_id), "UserId")
            .and(WhereClause::eq(self.ctx.ident(&t.login_provider), "LoginProvider"))
            .and(WhereClause::eq(self.ctx.ident(&t.provider_key), "ProviderKey"));
        let sql = Delete::from(self.ctx.table(t), filter).build_sql();
        let statement = Statement::new(sql)
            .bind("UserId", user.id.to_sql_value())
            .bind("LoginProvider", login_provider)
            .bind("ProviderKey", provider_key);

        self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user = ?user.id))]
    pub async fn get_logins(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserLoginInfo>> {
        let t = &self.ctx.options().tables.user_logins;
        let sql = Select::columns([
            self.ctx.ident(&t.login_provider),
            self.ctx.ident(&t.provider_key),
            self.ctx.ident(&t.provider_display_name),
        ])
        .from(self.ctx.table(t))
        .where_(WhereClause::eq(self.ctx.ident(&t.user_id), "UserId"))
        .build_sql();
        let statement = Statement::new(sql).bind("UserId", user.id.to_sql_value());

        let result = self.ctx.open(cancel).await?.query(&statement).await?;
        result
            .rows_ref()
            .iter()
            .map(|row| -> Result<UserLoginInfo> {
                Ok(UserLoginInfo::new(
                    row.get_string(t.login_provider.as_str())?.unwrap_or_default(),
                    row.get_string(t.provider_key.as_str())?.unwrap_or_default(),
                    row.get_string(t.provider_display_name.as_str())?,
                ))
            })
            .collect()
    }

    #[instrument(skip_all, fields(provider = login_provider))]
    pub async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>> {
        let options = self.ctx.options();
        let (t, ul) = (&options.tables.users, &options.tables.user_logins);
        let sql = Select::columns(self.user_columns(USER))
            .from(format!("{} {}", self.ctx.table(t), USER))
            .inner_join(
                format!("{} {}", self.ctx.table(ul), USER_LOGIN),
                self.ctx.aliased(USER_LOGIN, &ul.user_id),
                self.ctx.aliased(USER, &t.id),
            )
            .where_(
                WhereClause::eq(self.ctx.aliased(USER_LOGIN, &ul.login_provider), "LoginProvider")
                    .and(WhereClause::eq(self.ctx.aliased(USER_LOGIN, &ul.provider_key), "ProviderKey")),
            )
            .build_sql();
        let statement = Statement::new(sql)
            .bind("LoginProvider", login_provider)
            .bind("ProviderKey", provider_key);

        let row = self.ctx.open(cancel).await?.query_optional(&statement).await?;
        row.map(|row| self.read_user(&row)).transpose()
    }

    #[instrument(skip_all, fields(user = ?user.id, provider = login_provider, token = name))]
    pub async fn get_token(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let t = &self.ctx.options().tables.user_tokens;
        let sql = Select::columns([self.ctx.ident(&t.value)])
            .from(self.ctx.table(t))
            .where_(self.token_filter())
            .build_sql();
        let statement = self.bind_token_key(Statement::new(sql), user, login_provider, name);

        let row = self.ctx.open(cancel).await?.query_optional(&statement).await?;
        match row {
            Some(row) => row.get_string(t.value.as_str()),
            None => Ok(None),
        }
    }

    /// Store a token, replacing any token with the same provider and name.
    #[instrument(skip_all, fields(user = ?user.id, provider = login_provider, token = name))]
    pub async fn set_token(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
        value: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_tokens;
        let delete = Delete::from(self.ctx.table(t), self.token_filter()).build_sql();
        let insert = Insert::into(self.ctx.table(t))
            .value(self.ctx.ident(&t.user_id), "UserId")
            .value(self.ctx.ident(&t.login_provider), "LoginProvider")
            .value(self.ctx.ident(&t.name), "Name")
            .value(self.ctx.ident(&t.value), "Value")
            .build_sql();

        let querier = self.ctx.open(cancel).await?;
        querier
            .execute(&self.bind_token_key(Statement::new(delete), user, login_provider, name))
            .await?;
        let statement = self
            .bind_token_key(Statement::new(insert), user, login_provider, name)
            .bind("Value", value);
        querier.execute(&statement).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user = ?user.id, provider = login_provider, token = name))]
    pub async fn remove_token(
        &self,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_tokens;
        let sql = Delete::from(self.ctx.table(t), self.token_filter()).build_sql();
        let statement = self.bind_token_key(Statement::new(sql), user, login_provider, name);

        self.ctx.open(cancel).await?.execute(&statement).await?;
        Ok(())
    }

    /// Add the user to a role.
    ///
    /// Fails with [`PgIdentityError::RoleNotFound`] when no role has the
    /// given normalized name. The lookup and the insert are not wrapped in a
    /// transaction.
    #[instrument(skip_all, fields(user = ?user.id, role = normalized_role_name))]
    pub async fn add_to_role(
        &self,
        user: &IdentityUser<K>,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_roles;
        let querier = self.ctx.open(cancel).await?;
        let role_id = self.require_role_id(&querier, normalized_role_name).await?;

        let sql = Insert::into(self.ctx.table(t))
            .value(self.ctx.ident(&t.user_id), "UserId")
            .value(self.ctx.ident(&t.role_id), "RoleId")
            .build_sql();
        let statement = Statement::new(sql)
            .bind("UserId", user.id.to_sql_value())
            .bind("RoleId", role_id.to_sql_value());
        querier.execute(&statement).await?;
        Ok(())
    }

    /// Remove the user from a role. Fails like [`UserStore::add_to_role`]
    /// when the role does not exist.
    #[instrument(skip_all, fields(user = ?user.id, role = normalized_role_name))]
    pub async fn remove_from_role(
        &self,
        user: &IdentityUser<K>,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let t = &self.ctx.options().tables.user_roles;
        let querier = self.ctx.open(cancel).await?;
        let role_id = self.require_role_id(&querier, normalized_role_name).await?;

        let filter = WhereClause::eq(self.ctx.ident(&t.user_id), "UserId")
            .and(WhereClause::eq(self.ctx.ident(&t.role_id), "RoleId"));
        let sql = Delete::from(self.ctx.table(t), filter).build_sql();
        let statement = Statement::new(sql)
            .bind("UserId", user.id.to_sql_value())
            .bind("RoleId", role_id.to_sql_value());
        querier.execute(&statement).await?;
        Ok(())
    }

    /// Names of the roles the user belongs to.
    #[instrument(skip_all, fields(user = ?user.id))]
    pub async fn get_roles(
        &self,
        user: &IdentityUser<K>,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let options = self.ctx.options();
        let (r, ur) = (&options.tables.roles, &options.tables.user_roles);
        let sql = Select::columns([self.ctx.aliased(ROLE, &r.name)])
            .from(format!("{} {}", self.ctx.table(r), ROLE))
            .inner_join(
                format!("{} {}", self.ctx.table(ur), USER_ROLE),
                self.ctx.aliased(USER_ROLE, &ur.role_id),
                self.ctx.aliased(ROLE, &r.id),
            )
            .where_(WhereClause::eq(self.ctx.aliased(USER_ROLE, &ur.user_id), "UserId"))
            .build_sql();
        let statement = Statement::new(sql).bind("UserId", user.id.to_sql_value());

        let result = self.ctx.open(cancel).await?.query(&statement).await?;
        let mut names = Vec::with_capacity(result.len());
        for row in result.rows_ref() {
            if let Some(name) = row.get_string(r.name.as_str())? {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// False when the role does not exist.
    #[instrument(skip_all, fields(user = ?user.id, role = normalized_role_name))]
    pub async fn is_in_role(
        &self,
        user: &IdentityUser<K>,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let options = self.ctx.options();
        let (r, ur) = (&options.tables.roles, &options.tables.user_roles);
        let sql = Select::columns([self.ctx.aliased(ROLE, &r.id)])
            .from(format!("{} {}", self.ctx.table(r), ROLE))
            .inner_join(
                format!("{} {}", self.ctx.table(ur), USER_ROLE),
                self.ctx.aliased(USER_ROLE, &ur.role_id),
                self.ctx.aliased(ROLE, &r.id),
            )
            .where_(
                WhereClause::eq(self.ctx.aliased(USER_ROLE, &ur.user_id), "UserId")
                    .and(WhereClause::eq(self.ctx.aliased(ROLE, &r.normalized_name), "NormalizedName")),
            )
            .limit(1)
            .build_sql();
        let statement = Statement::new(sql)
            .bind("UserId", user.id.to_sql_value())
            .bind("NormalizedName", normalized_role_name);

        let row = self.ctx.open(cancel).await?.query_optional(&statement).await?;
        Ok(row.is_some())
    }

    /// Members of a role; empty when the role does not exist.
    #[instrument(skip_all, fields(role = normalized_role_name))]
    pub async fn get_users_in_role(
        &self,
        normalized_role_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<IdentityUser<K>>> {
        let options = self.ctx.options();
        let (t, r, ur) = (
            &options.tables.users,
            &options.tables.roles,
            &options.tables.user_roles,
        );
        let sql = Select::columns(self.user_columns(USER))
            .from(format!("{} {}", self.ctx.table(t), USER))
            .inner_join(
                format!("{} {}", self.ctx.table(ur), USER_ROLE),
                self.ctx.aliased(USER_ROLE, &ur.user_id),
                self.ctx.aliased(USER, &t.id),
            )
            .inner_join(
                format!("{} {}", self.ctx.table(r), ROLE),
                self.ctx.aliased(ROLE, &r.id),
                self.ctx.aliased(USER_ROLE, &ur.role_id),
            )
            .where_(WhereClause::eq(self.ctx.aliased(ROLE, &r.normalized_name), "NormalizedName"))
            .build_sql();
        let statement = Statement::new(sql).bind("NormalizedName", normalized_role_name);
        self.load_users(&statement, cancel).await
    }

    /// User columns selected through `alias`, extras included.
    fn user_columns(&self, alias: &str) -> Vec<ColumnRef> {
        let options = self.ctx.options();
        let t = &options.tables.users;
        let mut columns: Vec<ColumnRef> = t
            .columns()
            .into_iter()
            .map(|name| self.ctx.aliased(alias, name))
            .collect();
        for (column, _) in self.extra_columns() {
            columns.push(ColumnRef::qualified(alias, options.identifier(&column)));
        }
        columns
    }

    fn extra_columns(&self) -> Vec<(String, String)> {
        let options = self.ctx.options();
        extra_read_columns(
            options,
            &options.user_insert_properties,
            &options.user_update_properties,
        )
    }

    fn read_user(&self, row: &Row) -> Result<IdentityUser<K>> {
        let t = &self.ctx.options().tables.users;
        Ok(IdentityUser {
            id: read_key(row, &t.id)?,
            user_name: row.get_string(t.user_name.as_str())?,
            normalized_user_name: row.get_string(t.normalized_user_name.as_str())?,
            email: row.get_string(t.email.as_str())?,
            normalized_email: row.get_string(t.normalized_email.as_str())?,
            email_confirmed: row.get_bool(t.email_confirmed.as_str())?,
            password_hash: row.get_string(t.password_hash.as_str())?,
            security_stamp: row.get_string(t.security_stamp.as_str())?,
            concurrency_stamp: row.get_string(t.concurrency_stamp.as_str())?,
            phone_number: row.get_string(t.phone_number.as_str())?,
            phone_number_confirmed: row.get_bool(t.phone_number_confirmed.as_str())?,
            two_factor_enabled: row.get_bool(t.two_factor_enabled.as_str())?,
            lockout_end: row.get_datetime(t.lockout_end.as_str())?,
            lockout_enabled: row.get_bool(t.lockout_enabled.as_str())?,
            access_failed_count: row
                .get_parsed_opt(t.access_failed_count.as_str())?
                .unwrap_or_default(),
            extra: read_extras(row, &self.extra_columns())?,
        })
    }

    async fn find_one(
        &self,
        column: &Name,
        param: &str,
        value: SqlValue,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentityUser<K>>> {
        let t = &self.ctx.options().tables.users;
        let sql = Select::columns(self.user_columns(USER))
            .from(format!("{} {}", self.ctx.table(t), USER))
            .where_(WhereClause::eq(self.ctx.aliased(USER, column), param))
            .build_sql();
        let statement = Statement::new(sql).bind(param, value);

        let row = self.ctx.open(cancel).await?.query_optional(&statement).await?;
        row.map(|row| self.read_user(&row)).transpose()
    }

    async fn load_users(
        &self,
        statement: &Statement,
        cancel: &CancellationToken,
    ) -> Result<Vec<IdentityUser<K>>> {
        let result = self.ctx.open(cancel).await?.query(statement).await?;
        result.rows_ref().iter().map(|row| self.read_user(row)).collect()
    }

    async fn require_role_id(
        &self,
        querier: &Querier<'_>,
        normalized_role_name: &str,
    ) -> Result<K> {
        let r = &self.ctx.options().tables.roles;
        let sql = Select::columns([self.ctx.ident(&r.id)])
            .from(self.ctx.table(r))
            .where_(WhereClause::eq(self.ctx.ident(&r.normalized_name), "NormalizedName"))
            .build_sql();
        let statement = Statement::new(sql).bind("NormalizedName", normalized_role_name);

        match querier.query_optional(&statement).await? {
            Some(row) => read_key(&row, &r.id),
            None => Err(PgIdentityError::RoleNotFound(normalized_role_name.to_string())),
        }
    }

    fn claim_filter(&self) -> WhereClause {
        let t = &self.ctx.options().tables.user_claims;
        WhereClause::eq(self.ctx.ident(&t.user_id), "UserId")
            .and(WhereClause::eq(self.ctx.ident(&t.claim_type), "ClaimType"))
            .and(WhereClause::eq(self.ctx.ident(&t.claim_value), "ClaimValue"))
    }

    fn token_filter(&self) -> WhereClause {
        let t = &self.ctx.options().tables.user_tokens;
        WhereClause::eq(self.ctx.ident(&t.user_id), "UserId")
            .and(WhereClause::eq(self.ctx.ident(&t.login_provider), "LoginProvider"))
            .and(WhereClause::eq(self.ctx.ident(&t.name), "Name"))
    }

    fn bind_token_key(
        &self,
        statement: Statement,
        user: &IdentityUser<K>,
        login_provider: &str,
        name: &str,
    ) -> Statement {
        statement
            .bind("UserId", user.id.to_sql_value())
            .bind("LoginProvider", login_provider)
            .bind("Name", name)
    }
}

pub(super) fn bind_all(statement: Statement, params: Vec<(String, SqlValue)>) -> Statement {
    params
        .into_iter()
        .fold(statement, |statement, (name, value)| statement.bind(name, value))
}
