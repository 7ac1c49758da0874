//! Canonical domain-event kinds delivered on the realtime stream.
//!
//! The backend announces listing mutations under colon-separated names
//! (`job:created`, `scheme:deleted`, ...). This crate centralizes those
//! wire names and the closed enumeration the console routes on, so adding
//! a kind is a compile-time-checked change instead of a string prefix test.

// Jobs
pub const TOPIC_JOB_CREATED: &str = "job:created";
pub const TOPIC_JOB_UPDATED: &str = "job:updated";
pub const TOPIC_JOB_DELETED: &str = "job:deleted";

// Schemes
pub const TOPIC_SCHEME_CREATED: &str = "scheme:created";
pub const TOPIC_SCHEME_UPDATED: &str = "scheme:updated";
pub const TOPIC_SCHEME_DELETED: &str = "scheme:deleted";

/// Logical refresh group an event fans out to. Screens register one
/// refresh callback per group, never per individual kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventGroup {
    Job,
    Scheme,
}

/// The finite set of domain events the backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    JobCreated,
    JobUpdated,
    JobDeleted,
    SchemeCreated,
    SchemeUpdated,
    SchemeDeleted,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::JobCreated,
        EventKind::JobUpdated,
        EventKind::JobDeleted,
        EventKind::SchemeCreated,
        EventKind::SchemeUpdated,
        EventKind::SchemeDeleted,
    ];

    /// Parse a wire event name. Unknown names return `None`; callers drop
    /// those events rather than guessing a group.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            TOPIC_JOB_CREATED => Some(EventKind::JobCreated),
            TOPIC_JOB_UPDATED => Some(EventKind::JobUpdated),
            TOPIC_JOB_DELETED => Some(EventKind::JobDeleted),
            TOPIC_SCHEME_CREATED => Some(EventKind::SchemeCreated),
            TOPIC_SCHEME_UPDATED => Some(EventKind::SchemeUpdated),
            TOPIC_SCHEME_DELETED => Some(EventKind::SchemeDeleted),
            _ => None,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::JobCreated => TOPIC_JOB_CREATED,
            EventKind::JobUpdated => TOPIC_JOB_UPDATED,
            EventKind::JobDeleted => TOPIC_JOB_DELETED,
            EventKind::SchemeCreated => TOPIC_SCHEME_CREATED,
            EventKind::SchemeUpdated => TOPIC_SCHEME_UPDATED,
            EventKind::SchemeDeleted => TOPIC_SCHEME_DELETED,
        }
    }

    pub fn group(self) -> EventGroup {
        match self {
            EventKind::JobCreated | EventKind::JobUpdated | EventKind::JobDeleted => {
                EventGroup::Job
            }
            EventKind::SchemeCreated | EventKind::SchemeUpdated | EventKind::SchemeDeleted => {
                EventGroup::Scheme
            }
        }
    }

    /// Fixed user-facing notice text for each kind.
    pub fn notice(self) -> &'static str {
        match self {
            EventKind::JobCreated => "New job created",
            EventKind::JobUpdated => "Job updated",
            EventKind::JobDeleted => "Job deleted",
            EventKind::SchemeCreated => "New scheme created",
            EventKind::SchemeUpdated => "Scheme updated",
            EventKind::SchemeDeleted => "Scheme deleted",
        }
    }
}
