//! Role gate for protected screens.
//!
//! A pure decision over the current session: no side effects, no storage
//! access. The caller performs the navigation the decision names.

use crate::session::{Role, Session};

/// Default requirement when a screen does not narrow it: any staff.
pub const ANY_STAFF: [Role; 2] = [Role::Admin, Role::Subadmin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectLogin,
    /// Wrong role for this screen; send the principal to their own home.
    RedirectHome(Role),
}

pub fn authorize(session: Option<&Session>, required: &[Role]) -> Access {
    let Some(session) = session else {
        return Access::RedirectLogin;
    };
    if required.contains(&session.principal.role) {
        Access::Allow
    } else {
        Access::RedirectHome(session.principal.role)
    }
}

pub fn authorize_any_staff(session: Option<&Session>) -> Access {
    authorize(session, &ANY_STAFF)
}
