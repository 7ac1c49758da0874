//! Who is logged in, with what role and permissions.
//!
//! The store is the single writer of the persisted credential file; every
//! other component treats the session as read-only. Transitions are
//! observable through a watch channel in the same call that mutates the
//! store, so the realtime layer can open or tear down its connection
//! without polling.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use rozgar_protocol::StaffUser;

const SESSION_FILE: &str = "session.json";

/// Recognized staff roles. Closed on purpose: an established [`Session`]
/// can never carry anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Subadmin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ADMIN" => Some(Role::Admin),
            "SUBADMIN" => Some(Role::Subadmin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Subadmin => "SUBADMIN",
        }
    }

    /// Home screen a staff member of this role lands on.
    pub fn home_screen(self) -> &'static str {
        match self {
            Role::Admin => "dashboard",
            Role::Subadmin => "subadmin-dashboard",
        }
    }
}

/// Backend permission grants for subadmin accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    CreateJobs,
    EditJobs,
    DeleteJobs,
    CreateSchemes,
    EditSchemes,
    DeleteSchemes,
    ViewUsers,
    ManageAdmins,
}

impl Permission {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CREATE_JOBS" => Some(Permission::CreateJobs),
            "EDIT_JOBS" => Some(Permission::EditJobs),
            "DELETE_JOBS" => Some(Permission::DeleteJobs),
            "CREATE_SCHEMES" => Some(Permission::CreateSchemes),
            "EDIT_SCHEMES" => Some(Permission::EditSchemes),
            "DELETE_SCHEMES" => Some(Permission::DeleteSchemes),
            "VIEW_USERS" => Some(Permission::ViewUsers),
            "MANAGE_ADMINS" => Some(Permission::ManageAdmins),
            _ => None,
        }
    }
}

/// The authenticated identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub mobile_number: String,
    pub role: Role,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    /// Region codes this principal administers; empty means unrestricted.
    #[serde(default)]
    pub assigned_states: Vec<String>,
}

impl Principal {
    /// Validate a wire-level user into a staff principal. The role check
    /// is the gate that keeps non-staff accounts out of the console.
    pub fn from_wire(user: &StaffUser) -> Result<Self, SessionError> {
        let role =
            Role::parse(&user.role).ok_or_else(|| SessionError::InvalidRole(user.role.clone()))?;
        let profile = user.admin_profile.clone().unwrap_or_default();
        let permissions = profile
            .permissions
            .iter()
            .filter_map(|p| {
                let parsed = Permission::parse(p);
                if parsed.is_none() {
                    tracing::debug!(permission = %p, "ignoring unknown permission grant");
                }
                parsed
            })
            .collect();
        Ok(Principal {
            id: user.id.clone(),
            mobile_number: user.mobile_number.clone(),
            role,
            name: profile.name.unwrap_or_else(|| user.mobile_number.clone()),
            email: profile.email,
            permissions,
            assigned_states: profile.assigned_states,
        })
    }
}

/// An authenticated session: opaque credential plus its principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unrecognized staff role: {0}")]
    InvalidRole(String),
    #[error("credential token must not be empty")]
    EmptyToken,
    #[error("session storage: {0}")]
    Storage(#[from] std::io::Error),
    #[error("session encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Single source of truth for the login state, backed by a JSON file under
/// the state directory so a restart restores the session without another
/// OTP round-trip.
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
    tx: watch::Sender<Option<Session>>,
}

impl SessionStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            path: state_dir.as_ref().join(SESSION_FILE),
            current: None,
            tx,
        }
    }

    /// Establish a session. Persists before activating: if the write
    /// fails nothing is kept in memory either.
    pub fn start_session(
        &mut self,
        token: String,
        principal: Principal,
    ) -> Result<Session, SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let session = Session { token, principal };
        self.persist(&session)?;
        self.current = Some(session.clone());
        self.tx.send_replace(self.current.clone());
        Ok(session)
    }

    /// Restore a persisted session at process start. Malformed state and
    /// unrecognized roles purge the file and leave the store
    /// unauthenticated; this never fails the caller.
    pub fn restore_session(&mut self) -> Option<Session> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };
        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) if !session.token.trim().is_empty() => {
                self.current = Some(session.clone());
                self.tx.send_replace(self.current.clone());
                Some(session)
            }
            Ok(_) => {
                tracing::warn!("persisted session has an empty token; purging");
                self.purge_file();
                None
            }
            Err(err) => {
                tracing::warn!(%err, "persisted session did not decode; purging");
                self.purge_file();
                None
            }
        }
    }

    /// Drop the session locally. Backend notification is the caller's
    /// concern and best-effort; local logout always succeeds.
    pub fn end_session(&mut self) {
        self.purge_file();
        self.current = None;
        self.tx.send_replace(None);
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Observe session transitions. The send happens inside the call that
    /// mutates the store.
    pub fn changes(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    fn persist(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn purge_file(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(%err, path = %self.path.display(), "failed to purge session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn admin_principal() -> Principal {
        Principal {
            id: "a1".into(),
            mobile_number: "9876543210".into(),
            role: Role::Admin,
            name: "Asha".into(),
            email: None,
            permissions: BTreeSet::new(),
            assigned_states: Vec::new(),
        }
    }

    #[test]
    fn start_session_persists_and_restores() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::new(dir.path());
        store
            .start_session("tok-1".into(), admin_principal())
            .expect("start");
        assert!(store.is_authenticated());

        let mut fresh = SessionStore::new(dir.path());
        let restored = fresh.restore_session().expect("restore");
        assert_eq!(restored.token, "tok-1");
        assert_eq!(restored.principal.role, Role::Admin);
    }

    #[test]
    fn empty_token_is_rejected_without_persisting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::new(dir.path());
        let err = store
            .start_session("  ".into(), admin_principal())
            .expect_err("empty token");
        assert!(matches!(err, SessionError::EmptyToken));
        assert!(!store.is_authenticated());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn end_session_purges_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::new(dir.path());
        store
            .start_session("tok-1".into(), admin_principal())
            .expect("start");
        store.end_session();
        store.end_session();
        assert!(!store.is_authenticated());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn restore_purges_unrecognized_role() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE);
        let stale = json!({
            "token": "tok-1",
            "principal": {
                "id": "u1",
                "mobile_number": "9876543210",
                "role": "USER",
                "name": "Not staff"
            }
        });
        fs::write(&path, serde_json::to_vec(&stale).unwrap()).unwrap();

        let mut store = SessionStore::new(dir.path());
        assert!(store.restore_session().is_none());
        assert!(!store.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn from_wire_rejects_non_staff_roles() {
        let user: StaffUser = serde_json::from_value(json!({
            "_id": "u1",
            "mobileNumber": "9876543210",
            "role": "USER"
        }))
        .unwrap();
        let err = Principal::from_wire(&user).expect_err("non-staff role");
        assert!(matches!(err, SessionError::InvalidRole(ref r) if r == "USER"));
    }

    #[test]
    fn from_wire_keeps_known_permissions_only() {
        let user: StaffUser = serde_json::from_value(json!({
            "_id": "s1",
            "mobileNumber": "9123456789",
            "role": "SUBADMIN",
            "adminProfile": {
                "name": "Ravi",
                "permissions": ["CREATE_JOBS", "FLY_TO_MARS", "VIEW_USERS"],
                "assignedStates": ["MH", "GJ"]
            }
        }))
        .unwrap();
        let principal = Principal::from_wire(&user).expect("staff principal");
        assert_eq!(principal.role, Role::Subadmin);
        assert_eq!(
            principal.permissions,
            BTreeSet::from([Permission::CreateJobs, Permission::ViewUsers])
        );
        assert_eq!(principal.assigned_states, vec!["MH", "GJ"]);
    }

    #[test]
    fn transitions_are_observable_in_the_same_update() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::new(dir.path());
        let rx = store.changes();
        assert!(rx.borrow().is_none());

        store
            .start_session("tok-1".into(), admin_principal())
            .expect("start");
        assert_eq!(
            rx.borrow().as_ref().map(|s| s.token.clone()),
            Some("tok-1".to_string())
        );

        store.end_session();
        assert!(rx.borrow().is_none());
    }
}
