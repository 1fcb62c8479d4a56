use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::traits::StoreKey;
use crate::types::SqlValue;

/// A user account.
///
/// `extra` carries the values of application-specific columns registered
/// through [`crate::ExtraProperties`], keyed by property name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentityUser<K> {
    pub id: K,
    pub user_name: Option<String>,
    pub normalized_user_name: Option<String>,
    pub email: Option<String>,
    pub normalized_email: Option<String>,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
    pub security_stamp: Option<String>,
    pub concurrency_stamp: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
    pub extra: BTreeMap<String, SqlValue>,
}

impl<K: StoreKey> IdentityUser<K> {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            concurrency_stamp: Some(Uuid::new_v4().to_string()),
            ..Self::default()
        }
    }

    /// Every column property except the key, in table order.
    pub(crate) fn property_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("UserName", self.user_name.clone().into()),
            ("NormalizedUserName", self.normalized_user_name.clone().into()),
            ("Email", self.email.clone().into()),
            ("NormalizedEmail", self.normalized_email.clone().into()),
            ("EmailConfirmed", self.email_confirmed.into()),
            ("PasswordHash", self.password_hash.clone().into()),
            ("SecurityStamp", self.security_stamp.clone().into()),
            ("ConcurrencyStamp", self.concurrency_stamp.clone().into()),
            ("PhoneNumber", self.phone_number.clone().into()),
            ("PhoneNumberConfirmed", self.phone_number_confirmed.into()),
            ("TwoFactorEnabled", self.two_factor_enabled.into()),
            ("LockoutEnd", self.lockout_end.into()),
            ("LockoutEnabled", self.lockout_enabled.into()),
            ("AccessFailedCount", self.access_failed_count.into()),
        ]
    }

    /// Name used in failure messages; the key when the user has no name.
    pub(crate) fn display_name(&self) -> String {
        match &self.user_name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

/// A role users can be assigned to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentityRole<K> {
    pub id: K,
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub concurrency_stamp: Option<String>,
    pub extra: BTreeMap<String, SqlValue>,
}

impl<K: StoreKey> IdentityRole<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            concurrency_stamp: Some(Uuid::new_v4().to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn property_values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("Name", self.name.clone().into()),
            ("NormalizedName", self.normalized_name.clone().into()),
            ("ConcurrencyStamp", self.concurrency_stamp.clone().into()),
        ]
    }

    pub(crate) fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

/// A claim attached to a user or role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// An external login linked to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
}

impl UserLoginInfo {
    pub fn new(
        login_provider: impl Into<String>,
        provider_key: impl Into<String>,
        provider_display_name: Option<String>,
    ) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
            provider_display_name,
        }
    }
}
