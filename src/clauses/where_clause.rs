use crate::sql::fragments::PARAMETER_PREFIX;
use crate::traits::ColumnRef;

/// Represents a WHERE clause condition.
/// Conditions compare a column against a named parameter; values are bound
/// on the statement separately.
#[derive(Debug, Clone)]
pub enum WhereClause {
    /// column = @param
    Eq(ColumnRef, String),
    /// clause AND clause
    And(Box<WhereClause>, Box<WhereClause>),
    /// clause OR clause
    Or(Box<WhereClause>, Box<WhereClause>),
}

impl WhereClause {
    /// Creates an equality condition: column = @param
    pub fn eq(column: impl Into<ColumnRef>, param: impl Into<String>) -> Self {
        WhereClause::Eq(column.into(), param.into())
    }

    /// Combines this clause with another using AND
    pub fn and(self, other: WhereClause) -> Self {
        WhereClause::And(Box::new(self), Box::new(other))
    }

    /// Combines this clause with another using OR
    pub fn or(self, other: WhereClause) -> Self {
        WhereClause::Or(Box::new(self), Box::new(other))
    }

    /// Builds the SQL fragment.
    pub fn build_sql(&self) -> String {
        match self {
            WhereClause::Eq(col, param) => {
                format!("{} = {}{}", col.qualified_name(), PARAMETER_PREFIX, param)
            }
            WhereClause::And(left, right) => {
                format!("{} AND {}", left.build_operand(), right.build_operand())
            }
            WhereClause::Or(left, right) => {
                format!("({}) OR ({})", left.build_sql(), right.build_sql())
            }
        }
    }

    // AND chains stay flat; anything else nested under AND gets parentheses.
    fn build_operand(&self) -> String {
        match self {
            WhereClause::Or(..) => format!("({})", self.build_sql()),
            _ => self.build_sql(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_clause() {
        let clause = WhereClause::eq(ColumnRef::qualified("u", "Name"), "Name");
        assert_eq!(clause.build_sql(), "u.Name = @Name");
    }

    #[test]
    fn test_and_clause() {
        let clause = WhereClause::eq("UserId", "UserId")
            .and(WhereClause::eq("LoginProvider", "LoginProvider"))
            .and(WhereClause::eq("Name", "Name"));

        assert_eq!(
            clause.build_sql(),
            "UserId = @UserId AND LoginProvider = @LoginProvider AND Name = @Name"
        );
    }

    #[test]
    fn test_or_under_and_is_parenthesized() {
        let clause = WhereClause::eq("a", "A").and(WhereClause::eq("b", "B").or(WhereClause::eq("c", "C")));
        assert_eq!(clause.build_sql(), "a = @A AND ((b = @B) OR (c = @C))");
    }
}
