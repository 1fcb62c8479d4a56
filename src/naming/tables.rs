use super::{Name, NamingPolicy};
use crate::traits::TableDescriptor;

macro_rules! table_descriptor {
    (
        $(#[$meta:meta])*
        $name:ident = $table:literal {
            $($field:ident => $column:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub table: Name,
            $(pub $field: Name,)+
        }

        impl $name {
            pub fn new(policy: Option<&dyn NamingPolicy>) -> Self {
                Self {
                    table: Name::new($table, policy),
                    $($field: Name::new($column, policy),)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(None)
            }
        }

        impl TableDescriptor for $name {
            fn table(&self) -> &Name {
                &self.table
            }

            fn columns(&self) -> Vec<&Name> {
                vec![$(&self.$field),+]
            }

            fn names_mut(&mut self) -> Vec<&mut Name> {
                vec![&mut self.table, $(&mut self.$field),+]
            }
        }
    };
}

table_descriptor! {
    /// Names for the users table.
    UsersTable = "Users" {
        id => "Id",
        user_name => "UserName",
        normalized_user_name => "NormalizedUserName",
        email => "Email",
        normalized_email => "NormalizedEmail",
        email_confirmed => "EmailConfirmed",
        password_hash => "PasswordHash",
        security_stamp => "SecurityStamp",
        concurrency_stamp => "ConcurrencyStamp",
        phone_number => "PhoneNumber",
        phone_number_confirmed => "PhoneNumberConfirmed",
        two_factor_enabled => "TwoFactorEnabled",
        lockout_end => "LockoutEnd",
        lockout_enabled => "LockoutEnabled",
        access_failed_count => "AccessFailedCount",
    }
}

table_descriptor! {
    /// Names for the roles table.
    RolesTable = "Roles" {
        id => "Id",
        name => "Name",
        normalized_name => "NormalizedName",
        concurrency_stamp => "ConcurrencyStamp",
    }
}

table_descriptor! {
    UserClaimsTable = "UserClaims" {
        id => "Id",
        user_id => "UserId",
        claim_type => "ClaimType",
        claim_value => "ClaimValue",
    }
}

table_descriptor! {
    UserLoginsTable = "UserLogins" {
        login_provider => "LoginProvider",
        provider_key => "ProviderKey",
        provider_display_name => "ProviderDisplayName",
        user_id => "UserId",
    }
}

table_descriptor! {
    UserTokensTable = "UserTokens" {
        user_id => "UserId",
        login_provider => "LoginProvider",
        name => "Name",
        value => "Value",
    }
}

table_descriptor! {
    /// Join table between users and roles.
    UserRolesTable = "UserRoles" {
        user_id => "UserId",
        role_id => "RoleId",
    }
}

table_descriptor! {
    RoleClaimsTable = "RoleClaims" {
        id => "Id",
        role_id => "RoleId",
        claim_type => "ClaimType",
        claim_value => "ClaimValue",
    }
}

/// The seven table descriptors used by the stores.
///
/// Each instance owns its names; nothing is shared between option sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableNames {
    pub users: UsersTable,
    pub roles: RolesTable,
    pub user_claims: UserClaimsTable,
    pub user_logins: UserLoginsTable,
    pub user_tokens: UserTokensTable,
    pub user_roles: UserRolesTable,
    pub role_claims: RoleClaimsTable,
}

impl TableNames {
    pub fn new(policy: Option<&dyn NamingPolicy>) -> Self {
        Self {
            users: UsersTable::new(policy),
            roles: RolesTable::new(policy),
            user_claims: UserClaimsTable::new(policy),
            user_logins: UserLoginsTable::new(policy),
            user_tokens: UserTokensTable::new(policy),
            user_roles: UserRolesTable::new(policy),
            role_claims: RoleClaimsTable::new(policy),
        }
    }

    /// Converts every name that is still at its canonical default.
    pub fn apply_naming_policy(&mut self, policy: &dyn NamingPolicy) {
        self.users.apply_naming_policy(policy);
        self.roles.apply_naming_policy(policy);
        self.user_claims.apply_naming_policy(policy);
        self.user_logins.apply_naming_policy(policy);
        self.user_tokens.apply_naming_policy(policy);
        self.user_roles.apply_naming_policy(policy);
        self.role_claims.apply_naming_policy(policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SnakeCase;

    #[test]
    fn test_defaults_without_policy() {
        let tables = TableNames::default();
        assert_eq!(tables.users.table_name(), "Users");
        assert_eq!(tables.users.normalized_user_name.as_str(), "NormalizedUserName");
        assert_eq!(tables.user_roles.table_name(), "UserRoles");
    }

    #[test]
    fn test_defaults_with_snake_case() {
        let tables = TableNames::new(Some(&SnakeCase));
        assert_eq!(tables.users.table_name(), "users");
        assert_eq!(tables.user_logins.table_name(), "user_logins");
        assert_eq!(tables.role_claims.claim_type.as_str(), "claim_type");
        assert_eq!(tables.users.column_for("AccessFailedCount"), Some("access_failed_count"));
    }

    #[test]
    fn test_column_for_unknown_property() {
        let tables = TableNames::default();
        assert_eq!(tables.roles.column_for("Description"), None);
    }

    #[test]
    fn test_columns_keep_declaration_order() {
        let tables = TableNames::default();
        let columns: Vec<&str> = tables.user_tokens.columns().iter().map(|n| n.as_str()).collect();
        assert_eq!(columns, vec!["UserId", "LoginProvider", "Name", "Value"]);
    }

    #[test]
    fn test_late_policy_preserves_overrides() {
        let mut tables = TableNames::default();
        tables.users.table.set("app_users");
        tables.users.email.set("EmailAddress");

        tables.apply_naming_policy(&SnakeCase);

        assert_eq!(tables.users.table_name(), "app_users");
        assert_eq!(tables.users.email.as_str(), "EmailAddress");
        assert_eq!(tables.users.user_name.as_str(), "user_name");
        assert_eq!(tables.roles.table_name(), "roles");
    }
}
