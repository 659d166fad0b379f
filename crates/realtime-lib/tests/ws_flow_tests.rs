// ============================
// crates/realtime-lib/tests/ws_flow_tests.rs
// ============================
//! End-to-end WebSocket flows against a real listening server.

use futures_util::{SinkExt, StreamExt};
use hrms_common::{EmployeeProfile, Identity, Role};
use hrms_realtime_lib::auth::TokenIssuer;
use hrms_realtime_lib::config::Settings;
use hrms_realtime_lib::store::MemoryStore;
use hrms_realtime_lib::{ws_router, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const SECRET: &str = "flow-test-secret";

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.put_identity(Identity {
        user_id: "u-mgr".to_string(),
        role: Role::Manager,
    });
    store.put_identity(Identity {
        user_id: "u-emp".to_string(),
        role: Role::Employee,
    });
    store.put_profile(EmployeeProfile {
        id: "p-mgr".to_string(),
        user_id: "u-mgr".to_string(),
        first_name: "Mira".to_string(),
        last_name: "Shah".to_string(),
        employee_code: "M-01".to_string(),
        designation: "Engineering Manager".to_string(),
        manager_id: None,
    });
    store.put_profile(EmployeeProfile {
        id: "p-emp".to_string(),
        user_id: "u-emp".to_string(),
        first_name: "Ben".to_string(),
        last_name: "Okafor".to_string(),
        employee_code: "E-07".to_string(),
        designation: "Engineer".to_string(),
        manager_id: Some("p-mgr".to_string()),
    });
    store
}

async fn spawn_server() -> SocketAddr {
    let settings = Settings {
        jwt_secret: SECRET.to_string(),
        ..Settings::default()
    };
    let state = Arc::new(AppState::new(seeded_store(), settings));
    let app = ws_router::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn token_for(user_id: &str) -> String {
    TokenIssuer::new(SECRET, 3600).issue(user_id).unwrap()
}

async fn connect(addr: SocketAddr, user_id: &str) -> WsClient {
    let url = format!("ws://{addr}/ws?token={}", token_for(user_id));
    let (ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("handshake failed");
    ws
}

async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection closed")
            .expect("transport error");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("invalid JSON frame");
        }
    }
}

async fn send_event(ws: &mut WsClient, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("send failed");
}

#[tokio::test]
async fn test_handshake_without_token_is_http_401() {
    let addr = spawn_server().await;
    let url = format!("ws://{addr}/ws");

    match tokio_tungstenite::connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected HTTP 401 rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_with_bad_token_is_http_401() {
    let addr = spawn_server().await;
    let url = format!("ws://{addr}/ws?token=not-a-jwt");

    match tokio_tungstenite::connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected HTTP 401 rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_greeting_then_dashboard_round_trip() {
    let addr = spawn_server().await;
    let mut ws = connect(addr, "u-mgr").await;

    let greeting = next_event(&mut ws).await;
    assert_eq!(greeting["event"], "connected");
    assert_eq!(greeting["userId"], "u-mgr");
    assert_eq!(greeting["role"], "MANAGER");

    send_event(&mut ws, json!({"event": "request_dashboard_data"})).await;

    let dashboard = next_event(&mut ws).await;
    assert_eq!(dashboard["event"], "dashboard_data");
    assert_eq!(dashboard["teamMembers"], 1);
    assert!(dashboard["attendanceData"].is_object());
    assert!(dashboard["pendingLeaves"].is_array());
    assert!(dashboard["performanceData"].is_object());
    assert!(dashboard["aiInsights"].is_object());
}

#[tokio::test]
async fn test_unauthorized_request_gets_single_error_event() {
    let addr = spawn_server().await;
    let mut ws = connect(addr, "u-emp").await;

    let greeting = next_event(&mut ws).await;
    assert_eq!(greeting["event"], "connected");

    send_event(&mut ws, json!({"event": "request_dashboard_data"})).await;

    let error = next_event(&mut ws).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["message"], "Access denied");

    // the connection survives: malformed input is also answered with an
    // error event instead of a close
    send_event(&mut ws, json!({"event": "no_such_event"})).await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["event"], "error");
}

#[tokio::test]
async fn test_second_login_supersedes_first_connection() {
    let addr = spawn_server().await;
    let mut first = connect(addr, "u-mgr").await;
    assert_eq!(next_event(&mut first).await["event"], "connected");

    let mut second = connect(addr, "u-mgr").await;
    assert_eq!(next_event(&mut second).await["event"], "connected");

    // requests over the new connection still work
    send_event(&mut second, json!({"event": "request_team_analytics"})).await;
    let analytics = next_event(&mut second).await;
    assert_eq!(analytics["event"], "team_analytics");
    assert_eq!(analytics["timeRange"], "month");
    assert_eq!(analytics["teamSize"], 1);
}
