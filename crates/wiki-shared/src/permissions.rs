//! Document capability checks.
//!
//! These gate what the client offers; the document store enforces the same
//! rules on its side and remains the authority.

use crate::models::{Document, User};

/// Admins may edit anything, everyone else only the documents they own.
pub fn can_edit(user: &User, doc: &Document) -> bool {
    user.role.overrides_ownership() || is_owner(user, doc)
}

pub fn can_create(user: &User) -> bool {
    user.role.can_create()
}

/// Same rule as [`can_edit`] for now, kept separate so the two can diverge.
pub fn can_delete(user: &User, doc: &Document) -> bool {
    user.role.overrides_ownership() || is_owner(user, doc)
}

pub fn is_owner(user: &User, doc: &Document) -> bool {
    user.email == doc.owner_email
}
