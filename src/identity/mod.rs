//! Identity entities and operation outcomes.

mod entities;
mod result;

pub use entities::{Claim, IdentityRole, IdentityUser, UserLoginInfo};
pub use result::{
    DefaultErrorDescriber, EntityKind, ErrorDescriber, FailureReason, IdentityError,
    IdentityResult,
};
