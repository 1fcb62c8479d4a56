//! Text fragments for INSERT and UPDATE statements.
//!
//! Names are interpolated as-is. Only values are parameterized, so callers
//! must pass identifier-safe strings that originate from code.

/// Default named-parameter prefix.
pub const PARAMETER_PREFIX: &str = "@";

const INDENT: &str = "    ";

/// `(c1, c2, ...)`, or one indented column per line when `multiline` is set.
pub fn columns_block<S: AsRef<str>>(names: &[S], multiline: bool) -> String {
    block(names.iter().map(|n| n.as_ref().to_string()), multiline)
}

/// `(@c1, @c2, ...)`, using the default `@` prefix.
pub fn parameters_block<S: AsRef<str>>(names: &[S], multiline: bool) -> String {
    parameters_block_with(names, multiline, PARAMETER_PREFIX, "")
}

/// Parameter block with a custom prefix and suffix around each name.
pub fn parameters_block_with<S: AsRef<str>>(
    names: &[S],
    multiline: bool,
    prefix: &str,
    suffix: &str,
) -> String {
    block(
        names
            .iter()
            .map(|n| format!("{}{}{}", prefix, n.as_ref(), suffix)),
        multiline,
    )
}

/// `column = @Property`, for SET clauses.
pub fn to_assignment(column: &str, property: &str) -> String {
    format!("{} = {}{}", column, PARAMETER_PREFIX, property)
}

fn block(entries: impl Iterator<Item = String>, multiline: bool) -> String {
    let entries: Vec<String> = entries.collect();
    if entries.is_empty() {
        return "()".to_string();
    }
    if multiline {
        let body: Vec<String> = entries
            .iter()
            .map(|e| format!("{}{}", INDENT, e))
            .collect();
        format!("(\n{}\n)", body.join(",\n"))
    } else {
        format!("({})", entries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_columns_block() {
        assert_eq!(columns_block(&["Id", "Name"], false), "(Id, Name)");
    }

    #[test]
    fn test_columns_block_entry_count() {
        let names = ["a", "b", "c", "d", "e"];
        let block = columns_block(&names, false);
        assert!(block.starts_with('(') && block.ends_with(')'));
        assert_eq!(block.matches('(').count(), 1);
        assert_eq!(block.matches(')').count(), 1);
        assert_eq!(block[1..block.len() - 1].split(", ").count(), names.len());
    }

    #[test]
    fn test_columns_block_multiline() {
        assert_eq!(
            columns_block(&["id", "name", "normalized_name"], true),
            "(\n    id,\n    name,\n    normalized_name\n)"
        );
    }

    #[test]
    fn test_parameters_block() {
        assert_eq!(parameters_block(&["Id", "Name"], false), "(@Id, @Name)");
    }

    #[test]
    fn test_parameters_block_multiline() {
        assert_eq!(
            parameters_block(&["Id", "Name"], true),
            "(\n    @Id,\n    @Name\n)"
        );
    }

    #[test]
    fn test_parameters_block_custom_prefix_and_suffix() {
        assert_eq!(
            parameters_block_with(&["Id", "Name"], false, ":", "_p"),
            "(:Id_p, :Name_p)"
        );
    }

    #[test]
    fn test_empty_blocks() {
        let empty: [&str; 0] = [];
        assert_eq!(columns_block(&empty, false), "()");
        assert_eq!(columns_block(&empty, true), "()");
        assert_eq!(parameters_block(&empty, true), "()");
    }

    #[test]
    fn test_to_assignment() {
        assert_eq!(
            to_assignment("normalized_name", "NormalizedName"),
            "normalized_name = @NormalizedName"
        );
    }
}
