//! Event subscription bridge between the realtime stream and the screens.
//!
//! Screens register a refresh callback per logical group (jobs, schemes);
//! each incoming domain event produces exactly one user notice and one
//! invocation of every callback registered for its group, in subscription
//! order. No payload crosses the bridge: a callback is a pure "please
//! refetch" signal.

use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rozgar_topics::{EventGroup, EventKind};

/// Minimal event envelope (RFC3339 time).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Envelope {
    pub time: String,
    pub kind: String,
    pub payload: Value,
}

impl Envelope {
    pub fn now(kind: &str, payload: Value) -> Self {
        let time = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        Self {
            time,
            kind: kind.to_string(),
            payload,
        }
    }
}

/// Sink for user-visible notices. The console prints these; tests collect
/// them. Closures work directly: `let n = |text: &str| { ... };`.
pub trait Notifier: Send + Sync {
    fn notify(&self, text: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, text: &str) {
        self(text)
    }
}

/// Notifier that only records notices on the log stream.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, text: &str) {
        tracing::info!(target: "rozgar::notice", "{text}");
    }
}

/// Refresh callbacks a screen wants for the duration of its lifetime.
/// At most one callback per group per subscription.
#[derive(Default)]
pub struct RefreshHooks {
    pub on_job_event: Option<RefreshFn>,
    pub on_scheme_event: Option<RefreshFn>,
}

pub type RefreshFn = Box<dyn Fn() + Send + Sync>;

struct Entry {
    id: u64,
    group: EventGroup,
    callback: RefreshFn,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    fn insert(&mut self, group: EventGroup, callback: RefreshFn) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            group,
            callback,
        });
        id
    }
}

/// The bridge itself. Cheap to clone; all clones share one registry.
///
/// The bridge never owns a connection. Subscribing while no connection is
/// live is a no-op until one forms; events from a dead connection are
/// never replayed.
#[derive(Clone, Default)]
pub struct Bridge {
    inner: Arc<Mutex<Registry>>,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the given hooks; the returned handle deregisters exactly
    /// the entries this call added, on `cancel()` or drop.
    pub fn subscribe(&self, hooks: RefreshHooks) -> Subscription {
        let mut reg = self.inner.lock().expect("bridge registry poisoned");
        let mut ids = Vec::new();
        if let Some(cb) = hooks.on_job_event {
            ids.push(reg.insert(EventGroup::Job, cb));
        }
        if let Some(cb) = hooks.on_scheme_event {
            ids.push(reg.insert(EventGroup::Scheme, cb));
        }
        Subscription {
            registry: Arc::downgrade(&self.inner),
            ids,
        }
    }

    /// Deliver one event: exactly one notice, then every callback
    /// registered for the kind's group in subscription order.
    ///
    /// Delivery and deregistration take the same lock, so once a handle's
    /// `cancel()` returns no further event reaches it. Callbacks must not
    /// call back into the bridge.
    pub fn dispatch(&self, kind: EventKind, notifier: &dyn Notifier) {
        notifier.notify(kind.notice());
        let group = kind.group();
        let reg = self.inner.lock().expect("bridge registry poisoned");
        for entry in reg.entries.iter().filter(|e| e.group == group) {
            (entry.callback)();
        }
    }

    /// Deliver an envelope from the wire. Unrecognized kinds are dropped;
    /// returns whether the envelope was dispatched.
    pub fn dispatch_envelope(&self, env: &Envelope, notifier: &dyn Notifier) -> bool {
        match EventKind::parse(&env.kind) {
            Some(kind) => {
                self.dispatch(kind, notifier);
                true
            }
            None => {
                tracing::debug!(kind = %env.kind, "dropping event with unrecognized kind");
                false
            }
        }
    }

    pub fn subscriber_count(&self, group: EventGroup) -> usize {
        let reg = self.inner.lock().expect("bridge registry poisoned");
        reg.entries.iter().filter(|e| e.group == group).count()
    }
}

/// Deregistration handle returned by [`Bridge::subscribe`].
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    ids: Vec<u64>,
}

impl Subscription {
    /// Remove this subscription's entries now instead of at drop.
    pub fn cancel(mut self) {
        self.remove_entries();
    }

    fn remove_entries(&mut self) {
        if self.ids.is_empty() {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            let mut reg = registry.lock().expect("bridge registry poisoned");
            reg.entries.retain(|e| !self.ids.contains(&e.id));
        }
        self.ids.clear();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove_entries();
    }
}
