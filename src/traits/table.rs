use crate::naming::{Name, NamingPolicy};

/// Trait representing the resolved names of one logical table.
/// Implementations are generated by the `table_descriptor!` macro.
pub trait TableDescriptor {
    /// The table name.
    fn table(&self) -> &Name;

    /// Every column in declaration order.
    fn columns(&self) -> Vec<&Name>;

    /// Table and column names, for bulk updates.
    fn names_mut(&mut self) -> Vec<&mut Name>;

    /// Returns the table name as it appears in the database.
    fn table_name(&self) -> &str {
        self.table().as_str()
    }

    /// Returns the column mapped to a canonical property name, if any.
    fn column_for(&self, property: &str) -> Option<&str> {
        self.columns()
            .into_iter()
            .find(|name| name.canonical() == property)
            .map(|name| name.as_str())
    }

    /// Converts every name still at its canonical default.
    fn apply_naming_policy(&mut self, policy: &dyn NamingPolicy) {
        for name in self.names_mut() {
            name.apply(policy);
        }
    }
}
