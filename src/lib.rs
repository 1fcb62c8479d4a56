//! pgidentity - identity persistence (users, roles, claims, logins, tokens)
//! on PostgreSQL with configurable table and column naming.
//!
//! # Example
//! ```ignore
//! use pgidentity::{IdentityRole, IdentityStore, IdentityStoreOptions, SnakeCase};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut options = IdentityStoreOptions::with_naming_policy(SnakeCase);
//! options.schema = Some("identity".to_string());
//! options.tables.users.table.set("accounts");
//!
//! let store = IdentityStore::connect("postgres://localhost/mydb", options)?;
//! let roles = store.roles::<uuid::Uuid>();
//!
//! let cancel = CancellationToken::new();
//! let mut role = IdentityRole::new("admin");
//! role.normalized_name = Some("ADMIN".to_string());
//! assert!(roles.create(&mut role, &cancel).await?.succeeded());
//! ```

pub mod builders;
pub mod clauses;
pub mod drivers;
pub mod error;
pub mod identity;
pub mod naming;
pub mod querier;
pub mod sql;
pub mod stores;
pub mod traits;
pub mod types;

mod client;
mod options;

// Re-export main types for convenient access
pub use clauses::WhereClause;
pub use client::IdentityStore;
pub use error::{PgIdentityError, Result};
pub use identity::{
    Claim, DefaultErrorDescriber, ErrorDescriber, FailureReason, IdentityError, IdentityResult,
    IdentityRole, IdentityUser, UserLoginInfo,
};
pub use naming::{FnNamingPolicy, IdentityNaming, NamingPolicy, SnakeCase, TableNames};
pub use options::{ExtraProperties, IdentityStoreOptions};
pub use querier::Querier;
pub use sql::Statement;
pub use stores::{RoleStore, UserStore};
pub use traits::{ColumnRef, ConnectionFactory, DatabaseConnection, StoreKey, TableDescriptor};
pub use types::{QueryResult, RawQueryResult, Row, SqlValue};
