//! Storage naming: policies that turn canonical PascalCase names into table
//! and column names, and the per-table descriptors built from them.

mod tables;

use std::fmt;

use convert_case::{Case, Casing};

pub use tables::{
    RoleClaimsTable, RolesTable, TableNames, UserClaimsTable, UserLoginsTable, UserRolesTable,
    UserTokensTable, UsersTable,
};

/// Converts a canonical PascalCase name into a storage name.
///
/// Implementations must be deterministic and total. Each name is converted
/// once, so idempotence is not required.
pub trait NamingPolicy: Send + Sync + fmt::Debug {
    fn convert(&self, name: &str) -> String;
}

/// Leaves names untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNaming;

impl NamingPolicy for IdentityNaming {
    fn convert(&self, name: &str) -> String {
        name.to_string()
    }
}

/// `NormalizedUserName` -> `normalized_user_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCase;

impl NamingPolicy for SnakeCase {
    fn convert(&self, name: &str) -> String {
        name.to_case(Case::Snake)
    }
}

/// Adapts any closure into a naming policy.
pub struct FnNamingPolicy<F>(pub F);

impl<F> fmt::Debug for FnNamingPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnNamingPolicy")
    }
}

impl<F> NamingPolicy for FnNamingPolicy<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn convert(&self, name: &str) -> String {
        (self.0)(name)
    }
}

/// Applies an optional policy; no policy means identity conversion.
pub fn convert_name(policy: Option<&dyn NamingPolicy>, name: &str) -> String {
    match policy {
        Some(policy) => policy.convert(name),
        None => name.to_string(),
    }
}

/// A table or column name that remembers its canonical default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    canonical: &'static str,
    value: String,
}

impl Name {
    pub(crate) fn new(canonical: &'static str, policy: Option<&dyn NamingPolicy>) -> Self {
        Self {
            canonical,
            value: convert_name(policy, canonical),
        }
    }

    /// The PascalCase name this field was derived from.
    pub fn canonical(&self) -> &'static str {
        self.canonical
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Overrides the name. Overrides are never touched by a later policy.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// True while the value still equals the unconverted canonical name.
    pub fn is_default(&self) -> bool {
        self.value == self.canonical
    }

    /// Converts the name only if it has not been customized.
    pub(crate) fn apply(&mut self, policy: &dyn NamingPolicy) {
        if self.is_default() {
            self.value = policy.convert(self.canonical);
        }
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_policy() {
        assert_eq!(SnakeCase.convert("NormalizedUserName"), "normalized_user_name");
        assert_eq!(SnakeCase.convert("Id"), "id");
        assert_eq!(SnakeCase.convert("UserLogins"), "user_logins");
    }

    #[test]
    fn test_absent_policy_is_identity() {
        assert_eq!(convert_name(None, "NormalizedUserName"), "NormalizedUserName");
        assert_eq!(IdentityNaming.convert("UserId"), "UserId");
    }

    #[test]
    fn test_fn_policy() {
        let policy = FnNamingPolicy(|name: &str| name.to_lowercase());
        assert_eq!(convert_name(Some(&policy), "RoleClaims"), "roleclaims");
    }

    #[test]
    fn test_apply_skips_customized_names() {
        let mut custom = Name::new("UserName", None);
        custom.set("login");
        let mut untouched = Name::new("UserName", None);

        custom.apply(&SnakeCase);
        untouched.apply(&SnakeCase);

        assert_eq!(custom.as_str(), "login");
        assert_eq!(untouched.as_str(), "user_name");
        assert!(!untouched.is_default());
    }
}
