use std::fmt;

/// A displayable failure with a machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

/// Outcome of a mutating store operation.
///
/// Hard errors (database failures, invalid arguments) are reported through
/// [`crate::Result`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResult {
    Success,
    Failed(Vec<IdentityError>),
}

impl IdentityResult {
    pub fn failed(error: IdentityError) -> Self {
        IdentityResult::Failed(vec![error])
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, IdentityResult::Success)
    }

    pub fn errors(&self) -> &[IdentityError] {
        match self {
            IdentityResult::Success => &[],
            IdentityResult::Failed(errors) => errors,
        }
    }
}

/// The kind of entity a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Role,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => f.write_str("user"),
            EntityKind::Role => f.write_str("role"),
        }
    }
}

/// Why a mutation had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    InsertFailed { entity: EntityKind, name: String },
    UpdateFailed { entity: EntityKind, name: String },
    DeleteFailed { entity: EntityKind, name: String },
}

/// Maps failure reasons to displayable errors.
///
/// Hosts supply their own implementation to localize messages.
pub trait ErrorDescriber: Send + Sync {
    fn describe(&self, reason: &FailureReason) -> IdentityError;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorDescriber;

impl ErrorDescriber for DefaultErrorDescriber {
    fn describe(&self, reason: &FailureReason) -> IdentityError {
        let (code, verb, entity, name) = match reason {
            FailureReason::InsertFailed { entity, name } => ("InsertFailed", "insert", entity, name),
            FailureReason::UpdateFailed { entity, name } => ("UpdateFailed", "update", entity, name),
            FailureReason::DeleteFailed { entity, name } => ("DeleteFailed", "delete", entity, name),
        };
        IdentityError {
            code: code.to_string(),
            description: format!("Could not {} {} {}.", verb, entity, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_descriptions() {
        let error = DefaultErrorDescriber.describe(&FailureReason::UpdateFailed {
            entity: EntityKind::Role,
            name: "admin".to_string(),
        });
        assert_eq!(error.code, "UpdateFailed");
        assert_eq!(error.description, "Could not update role admin.");

        let error = DefaultErrorDescriber.describe(&FailureReason::InsertFailed {
            entity: EntityKind::User,
            name: "alice".to_string(),
        });
        assert_eq!(error.description, "Could not insert user alice.");
    }

    #[test]
    fn test_result_accessors() {
        assert!(IdentityResult::Success.succeeded());
        assert!(IdentityResult::Success.errors().is_empty());

        let failed = IdentityResult::failed(IdentityError {
            code: "X".to_string(),
            description: "x".to_string(),
        });
        assert!(!failed.succeeded());
        assert_eq!(failed.errors().len(), 1);
    }
}
