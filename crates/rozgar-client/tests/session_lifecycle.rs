//! OTP verify -> session start -> live connection -> refetch fan-out ->
//! logout teardown, against a mock backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use rozgar_client::{ApiClient, ConnectionManager, ConnectionState};
use rozgar_core::{Role, SessionStore};
use rozgar_events::{Bridge, Notifier, RefreshHooks};

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
async fn login_connects_and_logout_tears_down() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/verify-otp");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": {
                        "token": "tok-live",
                        "user": {
                            "_id": "a1",
                            "mobileNumber": "9876543210",
                            "role": "ADMIN",
                            "adminProfile": {"name": "Asha"}
                        }
                    }
                }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/events")
                .header("authorization", "Bearer tok-live");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body("event: job:created\ndata: {\"_id\":\"j1\"}\n\n");
        })
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::new(dir.path());
    let client = ApiClient::new(server.base_url()).expect("client");

    let (token, principal) = client
        .verify_otp("9876543210", "123456", None)
        .await
        .expect("verify otp");
    assert_eq!(principal.role, Role::Admin);
    store
        .start_session(token, principal)
        .expect("start session");

    let bridge = Bridge::new();
    let refetches = Arc::new(Mutex::new(0usize));
    let hits = refetches.clone();
    let _sub = bridge.subscribe(RefreshHooks {
        on_job_event: Some(Box::new(move || {
            *hits.lock().unwrap() += 1;
        })),
        ..Default::default()
    });

    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = notices.clone();
    let notifier: Arc<dyn Notifier> =
        Arc::new(move |text: &str| sink.lock().unwrap().push(text.to_string()));

    let mut manager = ConnectionManager::new(
        client.http().clone(),
        server.base_url(),
        bridge,
        notifier,
    );
    manager.on_session_change(store.session());

    let delivered = {
        let refetches = refetches.clone();
        wait_until(move || *refetches.lock().unwrap() >= 1).await
    };
    assert!(delivered, "job event never triggered a refetch");
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert!(notices
        .lock()
        .unwrap()
        .contains(&"New job created".to_string()));

    store.end_session();
    manager.on_session_change(store.session());
    assert_eq!(manager.state(), ConnectionState::Absent);
}
