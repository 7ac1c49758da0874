//! Connection manager for the realtime event stream.
//!
//! Exactly one live connection per session: the manager opens a stream
//! when a session with a non-empty credential appears, reuses it while
//! the same credential stays current, and tears it down unconditionally
//! on every exit path (logout, credential swap, drop). Connect failures
//! never surface to the caller; the console just runs without realtime
//! updates until the transport recovers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;

use rozgar_core::Session;
use rozgar_events::{Bridge, Envelope, Notifier};

use crate::sse::SseParser;

/// Lifecycle of the one connection. Reconnect attempts after a transport
/// error show up as `Connecting`; no separate reconnecting state exists
/// at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Absent,
    Connecting,
    Connected,
}

struct Shared {
    state: Mutex<ConnectionState>,
}

impl Shared {
    fn set(&self, state: ConnectionState) {
        *self.state.lock().expect("connection state poisoned") = state;
    }

    fn get(&self) -> ConnectionState {
        *self.state.lock().expect("connection state poisoned")
    }
}

pub struct ConnectionManager {
    http: reqwest::Client,
    events_url: String,
    bridge: Bridge,
    notifier: Arc<dyn Notifier>,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
    token: Option<String>,
    spawns: u64,
}

impl ConnectionManager {
    pub fn new(
        http: reqwest::Client,
        events_url: impl Into<String>,
        bridge: Bridge,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            http,
            events_url: events_url.into().trim_end_matches('/').to_string(),
            bridge,
            notifier,
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectionState::Absent),
            }),
            task: None,
            token: None,
            spawns: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.get()
    }

    /// React to a session transition. Absent session (or an empty
    /// credential) tears the connection down; a present session opens one
    /// unless the live connection already carries the same credential.
    pub fn on_session_change(&mut self, session: Option<&Session>) {
        match session {
            None => self.teardown(),
            Some(session) if session.token.trim().is_empty() => self.teardown(),
            Some(session) => {
                if self.is_live() && self.token.as_deref() == Some(session.token.as_str()) {
                    return;
                }
                self.teardown();
                self.spawn(session.token.clone());
            }
        }
    }

    /// Unconditional release of the connection. Safe to call with none
    /// active; calling twice ends in the same `Absent` state as once.
    pub fn teardown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.token = None;
        self.shared.set(ConnectionState::Absent);
    }

    fn is_live(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn spawn(&mut self, token: String) {
        self.shared.set(ConnectionState::Connecting);
        self.spawns += 1;
        let http = self.http.clone();
        let url = format!("{}/events", self.events_url);
        let bridge = self.bridge.clone();
        let notifier = self.notifier.clone();
        let shared = self.shared.clone();
        self.token = Some(token.clone());
        self.task = Some(tokio::spawn(run_transport(
            http, url, token, bridge, notifier, shared,
        )));
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_transport(
    http: reqwest::Client,
    url: String,
    token: String,
    bridge: Bridge,
    notifier: Arc<dyn Notifier>,
    shared: Arc<Shared>,
) {
    let mut backoff = 1u64;
    loop {
        match stream_events_once(&http, &url, &token, &bridge, notifier.as_ref(), &shared).await {
            Ok(()) => {
                backoff = 1;
            }
            Err(err) => {
                // No user-visible error: screens fall back to manual refetch.
                tracing::debug!(%err, "realtime stream unavailable");
                shared.set(ConnectionState::Connecting);
                backoff = (backoff * 2).min(30);
            }
        }
        tokio::time::sleep(Duration::from_secs(backoff)).await;
    }
}

async fn stream_events_once(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    bridge: &Bridge,
    notifier: &dyn Notifier,
    shared: &Shared,
) -> Result<(), anyhow::Error> {
    let resp = http
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .bearer_auth(token)
        .send()
        .await?;
    if !resp.status().is_success() {
        anyhow::bail!("events stream failed: {}", resp.status());
    }
    shared.set(ConnectionState::Connected);
    let mut stream = resp.bytes_stream();
    let mut parser = SseParser::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for frame in parser.push(&chunk) {
            let payload =
                serde_json::from_str(&frame.data).unwrap_or(serde_json::Value::Null);
            let env = Envelope::now(&frame.event, payload);
            bridge.dispatch_envelope(&env, notifier);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rozgar_core::{Principal, Role, Session};
    use rozgar_events::RefreshHooks;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            principal: Principal {
                id: "a1".into(),
                mobile_number: "9876543210".into(),
                role: Role::Admin,
                name: "Asha".into(),
                email: None,
                permissions: BTreeSet::new(),
                assigned_states: Vec::new(),
            },
        }
    }

    fn manager(base: &str, bridge: Bridge) -> ConnectionManager {
        ConnectionManager::new(
            reqwest::Client::new(),
            base.to_string(),
            bridge,
            Arc::new(rozgar_events::LogNotifier),
        )
    }

    async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn teardown_without_connection_is_a_noop() {
        let mut mgr = manager("http://127.0.0.1:1", Bridge::new());
        assert_eq!(mgr.state(), ConnectionState::Absent);
        mgr.on_session_change(None);
        assert_eq!(mgr.state(), ConnectionState::Absent);
    }

    #[tokio::test]
    async fn teardown_twice_matches_teardown_once() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body("event: job:created\ndata: {}\n\n");
            })
            .await;

        let mut mgr = manager(&server.base_url(), Bridge::new());
        mgr.on_session_change(Some(&session("tok-1")));
        assert_ne!(mgr.state(), ConnectionState::Absent);
        mgr.teardown();
        assert_eq!(mgr.state(), ConnectionState::Absent);
        mgr.teardown();
        assert_eq!(mgr.state(), ConnectionState::Absent);
    }

    #[tokio::test]
    async fn same_session_reuses_the_live_connection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body("");
            })
            .await;

        let mut mgr = manager(&server.base_url(), Bridge::new());
        let s = session("tok-1");
        mgr.on_session_change(Some(&s));
        mgr.on_session_change(Some(&s));
        assert_eq!(mgr.spawns, 1);
    }

    #[tokio::test]
    async fn a_new_session_gets_a_fresh_connection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body("");
            })
            .await;

        let mut mgr = manager(&server.base_url(), Bridge::new());
        mgr.on_session_change(Some(&session("tok-1")));
        mgr.on_session_change(Some(&session("tok-2")));
        assert_eq!(mgr.spawns, 2);
    }

    #[tokio::test]
    async fn empty_token_never_opens_a_connection() {
        let mut mgr = manager("http://127.0.0.1:1", Bridge::new());
        mgr.on_session_change(Some(&session(" ")));
        assert_eq!(mgr.state(), ConnectionState::Absent);
        assert_eq!(mgr.spawns, 0);
    }

    #[tokio::test]
    async fn events_reach_subscribers_in_arrival_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/events")
                    .header("authorization", "Bearer tok-1");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(concat!(
                        "event: job:created\ndata: {\"_id\":\"j1\"}\n\n",
                        "event: user:created\ndata: {}\n\n",
                        "event: scheme:deleted\ndata: {\"_id\":\"s1\"}\n\n",
                    ));
            })
            .await;

        let bridge = Bridge::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let jobs = order.clone();
        let schemes = order.clone();
        let _sub = bridge.subscribe(RefreshHooks {
            on_job_event: Some(Box::new(move || jobs.lock().unwrap().push("job"))),
            on_scheme_event: Some(Box::new(move || schemes.lock().unwrap().push("scheme"))),
        });

        let mut mgr = manager(&server.base_url(), bridge);
        mgr.on_session_change(Some(&session("tok-1")));

        let delivered = {
            let order = order.clone();
            wait_until(move || order.lock().unwrap().len() == 2).await
        };
        assert!(delivered, "events were not dispatched in time");
        assert_eq!(*order.lock().unwrap(), vec!["job", "scheme"]);
        assert_eq!(mgr.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn rejected_connect_degrades_silently() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events");
                then.status(401);
            })
            .await;

        let hits = Arc::new(AtomicUsize::new(0));
        let bridge = Bridge::new();
        let h = hits.clone();
        let _sub = bridge.subscribe(RefreshHooks {
            on_job_event: Some(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        });

        let mut mgr = manager(&server.base_url(), bridge);
        mgr.on_session_change(Some(&session("tok-1")));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_ne!(mgr.state(), ConnectionState::Connected);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn session_loss_tears_the_connection_down() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body("");
            })
            .await;

        let mut mgr = manager(&server.base_url(), Bridge::new());
        mgr.on_session_change(Some(&session("tok-1")));
        assert_ne!(mgr.state(), ConnectionState::Absent);
        mgr.on_session_change(None);
        assert_eq!(mgr.state(), ConnectionState::Absent);
        assert!(!mgr.is_live());
    }
}
