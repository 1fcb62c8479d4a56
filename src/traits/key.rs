use std::fmt::{Debug, Display};

use uuid::Uuid;

use crate::error::{PgIdentityError, Result};
use crate::types::SqlValue;

/// A primary key type usable for users and roles.
pub trait StoreKey: Clone + Debug + Display + Default + PartialEq + Send + Sync + 'static {
    /// A fresh key for a new entity, or `None` when the database assigns keys.
    fn generate() -> Option<Self>;

    /// Converts the key into a statement parameter.
    fn to_sql_value(&self) -> SqlValue;

    /// Parses a key read back from a result row.
    fn parse_key(raw: &str) -> Result<Self>;

    /// True while the key still holds its default (unassigned) value.
    fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

impl StoreKey for String {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4().to_string())
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn parse_key(raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

impl StoreKey for Uuid {
    fn generate() -> Option<Self> {
        Some(Uuid::new_v4())
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Uuid(*self)
    }

    fn parse_key(raw: &str) -> Result<Self> {
        Uuid::parse_str(raw).map_err(|_| invalid_key(raw))
    }
}

impl StoreKey for i32 {
    fn generate() -> Option<Self> {
        None
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int32(*self)
    }

    fn parse_key(raw: &str) -> Result<Self> {
        raw.parse().map_err(|_| invalid_key(raw))
    }
}

impl StoreKey for i64 {
    fn generate() -> Option<Self> {
        None
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int64(*self)
    }

    fn parse_key(raw: &str) -> Result<Self> {
        raw.parse().map_err(|_| invalid_key(raw))
    }
}

fn invalid_key(raw: &str) -> PgIdentityError {
    PgIdentityError::InvalidValue {
        column: "Id".to_string(),
        value: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_uuid_keys_are_generated() {
        let key = String::generate().unwrap();
        assert!(Uuid::parse_str(&key).is_ok());
        assert!(Uuid::generate().is_some());
    }

    #[test]
    fn test_integer_keys_are_left_to_the_database() {
        assert!(i32::generate().is_none());
        assert!(i64::generate().is_none());
        assert!(0i32.is_unset());
        assert!(!7i64.is_unset());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(i32::parse_key("42").unwrap(), 42);
        assert!(i64::parse_key("x").is_err());
        let id = Uuid::new_v4();
        assert_eq!(Uuid::parse_key(&id.to_string()).unwrap(), id);
    }
}
