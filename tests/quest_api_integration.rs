//! Integration tests for the quest REST + WebSocket surface.
//!
//! Each test spins up an Axum server on a random port with short dwell
//! times, then drives it with reqwest and tokio-tungstenite.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use quest_navigator::config::QuestConfig;
use quest_navigator::routes::quest_routes;
use quest_navigator::session::SessionRegistry;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn test_config() -> QuestConfig {
    QuestConfig {
        interstitial_dwell: Duration::from_millis(40),
        loading_dwell: Duration::from_millis(40),
        advisory_ttl: Duration::from_millis(300),
        ..QuestConfig::default()
    }
}

/// Start an Axum server on a random port, return the base URL.
async fn start_server() -> String {
    start_server_with(test_config()).await
}

async fn start_server_with(config: QuestConfig) -> String {
    let registry = SessionRegistry::new(&config);
    let app = quest_routes(registry, &config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("127.0.0.1:{port}")
}

/// Create a session and return its id.
async fn create_session(client: &reqwest::Client, addr: &str) -> String {
    let resp = client
        .post(format!("http://{addr}/api/sessions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["screen"], "landing");
    body["id"].as_str().unwrap().to_string()
}

/// POST a bodiless action and return (status, body).
async fn post_action(client: &reqwest::Client, addr: &str, id: &str, action: &str) -> (u16, Value) {
    let resp = client
        .post(format!("http://{addr}/api/sessions/{id}/{action}"))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

async fn get_view(client: &reqwest::Client, addr: &str, id: &str) -> Value {
    client
        .get(format!("http://{addr}/api/sessions/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

/// Poll the session until `pred` holds.
async fn wait_for(client: &reqwest::Client, addr: &str, id: &str, pred: impl Fn(&Value) -> bool) -> Value {
    loop {
        let view = get_view(client, addr, id).await;
        if pred(&view) {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Advance and wait for the interstitial to finish.
async fn finish_step(client: &reqwest::Client, addr: &str, id: &str) {
    let (status, view) = post_action(client, addr, id, "advance").await;
    assert_eq!(status, 200);
    let step = view["wizard"]["step"].as_u64().unwrap();
    wait_for(client, addr, id, |v| {
        v["screen"] != "wizard" || v["wizard"]["step"].as_u64() == Some(step + 1)
    })
    .await;
}

/// Parse a WS text frame into a serde_json::Value.
fn parse_ws_json(msg: &Message) -> Value {
    match msg {
        Message::Text(txt) => serde_json::from_str(txt).expect("invalid JSON from server"),
        other => panic!("expected Text frame, got {:?}", other),
    }
}

/// Read frames until one of the given `type` arrives.
async fn next_event<S>(ws: &mut S, kind: &str) -> Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        let json = parse_ws_json(&msg);
        if json["type"] == kind {
            return json;
        }
    }
}

// ── REST Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_and_content() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;

        let body: Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);

        let body: Value = reqwest::get(format!("http://{addr}/api/content"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["quest_steps"].as_array().unwrap().len(), 6);
        assert_eq!(body["industries"].as_array().unwrap().len(), 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sub_form_navigation_reaches_next_step() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;

        let (status, view) = post_action(&client, &addr, &id, "start").await;
        assert_eq!(status, 200);
        assert_eq!(view["screen"], "wizard");
        assert_eq!(view["wizard"]["step"], 1);
        assert_eq!(view["score"], 0);

        let (_, view) = post_action(&client, &addr, &id, "next").await;
        assert_eq!(view["wizard"]["page"]["page"], "goals");
        assert!(!view["wizard"]["transitioning"].as_bool().unwrap());

        let (_, view) = post_action(&client, &addr, &id, "next").await;
        assert!(view["wizard"]["transitioning"].as_bool().unwrap());

        let view = wait_for(&client, &addr, &id, |v| v["wizard"]["step"] == 2).await;
        assert_eq!(view["wizard"]["page"]["step"], "vision");
        assert_eq!(view["score"], 12);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_quest_produces_snapshot() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;
        post_action(&client, &addr, &id, "start").await;

        let resp = client
            .patch(format!("http://{addr}/api/sessions/{id}/profile"))
            .json(&json!({"section": "mission", "company_name": "Initech", "industry": "BFSI"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let resp = client
            .patch(format!("http://{addr}/api/sessions/{id}/profile"))
            .json(&json!({"section": "vision", "model": "Innovation Hub"}))
            .send()
            .await
            .unwrap();
        let view: Value = resp.json().await.unwrap();
        assert_eq!(view["score"], 10);

        // Snapshot is not available mid-quest
        let resp = client
            .get(format!("http://{addr}/api/sessions/{id}/snapshot"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);

        for _ in 1..=6 {
            finish_step(&client, &addr, &id).await;
        }
        wait_for(&client, &addr, &id, |v| v["screen"] == "results").await;

        let snapshot: Value = client
            .get(format!("http://{addr}/api/sessions/{id}/snapshot"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(snapshot["company_name"], "Initech");
        assert_eq!(snapshot["archetype"], "Innovation Hub");
        assert_eq!(snapshot["score"]["score"], 70);
        assert_eq!(snapshot["industry_benchmark"]["industry"], "BFSI");
        assert_eq!(snapshot["profile_digest"].as_str().unwrap().len(), 64);

        let (status, view) = post_action(&client, &addr, &id, "reset").await;
        assert_eq!(status, 200);
        assert_eq!(view["screen"], "landing");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn custom_stack_and_tags() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;
        post_action(&client, &addr, &id, "start").await;

        let resp = client
            .put(format!("http://{addr}/api/sessions/{id}/stack-draft"))
            .json(&json!({"text": "  Rust  "}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let (status, view) = post_action(&client, &addr, &id, "stacks").await;
        assert_eq!(status, 200);
        assert_eq!(view["wizard"]["profile"]["tech"]["stacks"], json!(["Rust"]));
        assert_eq!(view["wizard"]["stack_draft"], "");
        assert_eq!(view["score"], 8);

        let resp = client
            .post(format!("http://{addr}/api/sessions/{id}/tags"))
            .json(&json!({"field": "kpis", "tag": "ROI (Return on Investment)"}))
            .send()
            .await
            .unwrap();
        let view: Value = resp.json().await.unwrap();
        assert_eq!(view["score"], 13);

        let resp = client
            .post(format!("http://{addr}/api/sessions/{id}/tags"))
            .json(&json!({"field": "kpis", "tag": "  "}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn error_statuses() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();

        let (status, body) = post_action(&client, &addr, "not-a-uuid", "start").await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Invalid session ID");

        let unknown = uuid::Uuid::new_v4().to_string();
        let (status, _) = post_action(&client, &addr, &unknown, "start").await;
        assert_eq!(status, 404);

        let id = create_session(&client, &addr).await;
        let (status, body) = post_action(&client, &addr, &id, "advance").await;
        assert_eq!(status, 409);
        assert!(body["error"].as_str().unwrap().contains("landing"));

        let (status, _) = post_action(&client, &addr, &id, "reset").await;
        assert_eq!(status, 409);

        let resp = client
            .delete(format!("http://{addr}/api/sessions/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let resp = client
            .get(format!("http://{addr}/api/sessions/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn session_limit_refuses_new_sessions() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server_with(QuestConfig {
            max_sessions: 1,
            ..test_config()
        })
        .await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;

        let resp = client
            .post(format!("http://{addr}/api/sessions"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 503);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("limit"));

        client
            .delete(format!("http://{addr}/api/sessions/{id}"))
            .send()
            .await
            .unwrap();
        create_session(&client, &addr).await;
    })
    .await
    .expect("test timed out");
}

// ── WebSocket Tests ──────────────────────────────────────────────────

#[tokio::test]
async fn ws_connect_receives_sync() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;

        let (mut ws, _resp) = connect_async(format!("ws://{addr}/ws/sessions/{id}"))
            .await
            .expect("WS connect failed");

        let msg = ws.next().await.unwrap().unwrap();
        let json = parse_ws_json(&msg);
        assert_eq!(json["type"], "session_sync");
        assert_eq!(json["session"]["id"], id.as_str());
        assert_eq!(json["session"]["screen"], "landing");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_actions_drive_the_wizard() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;

        let (mut ws, _resp) = connect_async(format!("ws://{addr}/ws/sessions/{id}"))
            .await
            .expect("WS connect failed");
        next_event(&mut ws, "session_sync").await;

        ws.send(Message::Text(json!({"action": "start"}).to_string().into()))
            .await
            .unwrap();
        let event = next_event(&mut ws, "screen_changed").await;
        assert_eq!(event["screen"], "wizard");

        ws.send(Message::Text(json!({"action": "advance"}).to_string().into()))
            .await
            .unwrap();
        let event = next_event(&mut ws, "transition_started").await;
        assert_eq!(event["step"], 1);
        assert!(!event["title"].as_str().unwrap().is_empty());

        let event = next_event(&mut ws, "step_entered").await;
        assert_eq!(event["step"], 2);
        assert_eq!(event["score"], 12);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_reports_rejected_actions() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;

        let (mut ws, _resp) = connect_async(format!("ws://{addr}/ws/sessions/{id}"))
            .await
            .expect("WS connect failed");
        next_event(&mut ws, "session_sync").await;

        ws.send(Message::Text(json!({"action": "retreat"}).to_string().into()))
            .await
            .unwrap();
        let event = next_event(&mut ws, "error").await;
        assert!(event["message"].as_str().unwrap().contains("not active"));

        ws.send(Message::Text(r#"{"action":"teleport"}"#.into()))
            .await
            .unwrap();
        let event = next_event(&mut ws, "error").await;
        assert!(event["message"].as_str().unwrap().starts_with("Invalid action"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_unknown_session_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let unknown = uuid::Uuid::new_v4();
        let result = connect_async(format!("ws://{addr}/ws/sessions/{unknown}")).await;
        assert!(result.is_err());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_advisory_raised_and_cleared() {
    timeout(TEST_TIMEOUT, async {
        let addr = start_server().await;
        let client = reqwest::Client::new();
        let id = create_session(&client, &addr).await;
        post_action(&client, &addr, &id, "start").await;
        for _ in 1..5 {
            finish_step(&client, &addr, &id).await;
        }

        let (mut ws, _resp) = connect_async(format!("ws://{addr}/ws/sessions/{id}"))
            .await
            .expect("WS connect failed");
        let sync = next_event(&mut ws, "session_sync").await;
        assert_eq!(sync["session"]["wizard"]["step"], 5);

        post_action(&client, &addr, &id, "advance").await;
        let event = next_event(&mut ws, "advisory_raised").await;
        assert!(event["message"].as_str().unwrap().contains("Compliance"));

        // Progress continues while the advisory is showing
        let event = next_event(&mut ws, "step_entered").await;
        assert_eq!(event["step"], 6);

        next_event(&mut ws, "advisory_cleared").await;
        let view = get_view(&client, &addr, &id).await;
        assert!(view["wizard"]["advisory"].is_null());
    })
    .await
    .expect("test timed out");
}
