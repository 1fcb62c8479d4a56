use std::sync::Arc;

use crate::error::{PgIdentityError, Result};
use crate::naming::{convert_name, NamingPolicy, TableNames};
use crate::traits::TableDescriptor;

/// Application-specific properties appended to generated INSERT or UPDATE
/// statements, in insertion order.
///
/// A `None` column is derived from the property name through the naming
/// policy when a statement is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraProperties {
    entries: Vec<(String, Option<String>)>,
}

impl ExtraProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property. Registering the same property again replaces its column.
    pub fn insert(&mut self, property: impl Into<String>, column: Option<String>) {
        let property = property.into();
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = column,
            None => self.entries.push((property, column)),
        }
    }

    /// Builder-style [`ExtraProperties::insert`].
    pub fn with(mut self, property: impl Into<String>, column: Option<&str>) -> Self {
        self.insert(property, column.map(str::to_string));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(column, property)` pairs with every column resolved.
    pub fn resolve(&self, policy: Option<&dyn NamingPolicy>) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(property, column)| {
                let column = column
                    .clone()
                    .unwrap_or_else(|| convert_name(policy, property));
                (column, property.clone())
            })
            .collect()
    }
}

/// Everything the stores need to know about the database layout.
///
/// Built once, then frozen behind an `Arc` by [`crate::IdentityStore`].
#[derive(Debug, Clone, Default)]
pub struct IdentityStoreOptions {
    naming_policy: Option<Arc<dyn NamingPolicy>>,
    /// Schema prefix for every table, e.g. `identity`.
    pub schema: Option<String>,
    pub tables: TableNames,
    pub user_insert_properties: ExtraProperties,
    pub user_update_properties: ExtraProperties,
    pub role_insert_properties: ExtraProperties,
    pub role_update_properties: ExtraProperties,
    /// Wrap every table and column name in double quotes.
    pub quote_identifiers: bool,
    /// Emit INSERT/UPDATE statements with one column per line.
    pub multiline_sql: bool,
}

impl IdentityStoreOptions {
    /// Options with canonical PascalCase names and no naming policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options whose default names are derived through `policy`.
    pub fn with_naming_policy(policy: impl NamingPolicy + 'static) -> Self {
        let policy: Arc<dyn NamingPolicy> = Arc::new(policy);
        Self {
            tables: TableNames::new(Some(policy.as_ref())),
            naming_policy: Some(policy),
            ..Self::default()
        }
    }

    /// Install the naming policy after construction.
    ///
    /// Names still at their canonical default are converted; names the
    /// caller already customized are left alone. Fails if a policy is
    /// already set.
    pub fn set_naming_policy(&mut self, policy: impl NamingPolicy + 'static) -> Result<()> {
        if self.naming_policy.is_some() {
            return Err(PgIdentityError::NamingPolicyAlreadySet);
        }
        let policy: Arc<dyn NamingPolicy> = Arc::new(policy);
        self.tables.apply_naming_policy(policy.as_ref());
        self.naming_policy = Some(policy);
        Ok(())
    }

    pub fn naming_policy(&self) -> Option<&dyn NamingPolicy> {
        self.naming_policy.as_deref()
    }

    /// Set the schema prefix.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Renders an identifier, quoting it when configured.
    pub fn identifier(&self, name: &str) -> String {
        if self.quote_identifiers {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    /// Renders a table name with its schema prefix.
    pub fn table_identifier<T: TableDescriptor>(&self, table: &T) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                self.identifier(schema),
                self.identifier(table.table_name())
            ),
            None => self.identifier(table.table_name()),
        }
    }

    /// Resolves extra properties to rendered `(column, property)` pairs.
    pub(crate) fn extra_columns(&self, extras: &ExtraProperties) -> Vec<(String, String)> {
        extras
            .resolve(self.naming_policy())
            .into_iter()
            .map(|(column, property)| (self.identifier(&column), property))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SnakeCase;

    #[test]
    fn test_naming_policy_can_only_be_set_once() {
        let mut options = IdentityStoreOptions::new();
        options.set_naming_policy(SnakeCase).unwrap();
        assert!(matches!(
            options.set_naming_policy(SnakeCase),
            Err(PgIdentityError::NamingPolicyAlreadySet)
        ));

        let mut options = IdentityStoreOptions::with_naming_policy(SnakeCase);
        assert!(options.set_naming_policy(SnakeCase).is_err());
    }

    #[test]
    fn test_overrides_survive_late_policy() {
        let mut options = IdentityStoreOptions::new();
        options.tables.users.normalized_user_name.set("NormName");
        options.set_naming_policy(SnakeCase).unwrap();

        assert_eq!(options.tables.users.normalized_user_name.as_str(), "NormName");
        assert_eq!(options.tables.users.normalized_email.as_str(), "normalized_email");
    }

    #[test]
    fn test_table_identifier_with_schema_and_quotes() {
        let mut options = IdentityStoreOptions::new().schema("identity");
        assert_eq!(options.table_identifier(&options.tables.users), "identity.Users");

        options.quote_identifiers = true;
        assert_eq!(
            options.table_identifier(&options.tables.users),
            "\"identity\".\"Users\""
        );
        assert_eq!(options.identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_extra_properties_resolve_through_policy() {
        let extras = ExtraProperties::new()
            .with("DisplayName", None)
            .with("TenantId", Some("tenant"));

        let options = IdentityStoreOptions::with_naming_policy(SnakeCase);
        assert_eq!(
            options.extra_columns(&extras),
            vec![
                ("display_name".to_string(), "DisplayName".to_string()),
                ("tenant".to_string(), "TenantId".to_string()),
            ]
        );

        let options = IdentityStoreOptions::new();
        assert_eq!(options.extra_columns(&extras)[0].0, "DisplayName");
    }

    #[test]
    fn test_extra_properties_replace_existing_entry() {
        let mut extras = ExtraProperties::new();
        extras.insert("Nickname", None);
        extras.insert("Nickname", Some("nick".to_string()));
        assert_eq!(extras.len(), 1);
        assert_eq!(extras.iter().next(), Some(("Nickname", Some("nick"))));
    }
}
