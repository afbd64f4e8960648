use axum::{
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

const SESSION_COOKIE: &str = "session=authenticated";

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static DEGRADED_SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

/// Analytics API stand-in. Lives on its own thread and runtime so it
/// outlives the per-test runtimes.
static UPSTREAM: Lazy<String> = Lazy::new(spawn_upstream);

#[cfg(unix)]
mod cleanup {
    use std::sync::Mutex;
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().filter(|pid| **pid > 0) {
                unsafe {
                    libc::kill(*pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn export_payload() -> Value {
    json!({
        "events": [
            { "event_type": "pageview", "session_id": "sess_1_a", "url": "https://shop.test/" },
            { "event_type": "click", "session_id": "sess_1_a", "url": "https://shop.test/" },
            { "event_type": "click", "session_id": "sess_2_b", "url": "https://shop.test/cart" }
        ],
        "total_events": 3
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|cookie| cookie.to_str().ok())
        .is_some_and(|cookie| cookie.contains(SESSION_COOKIE))
}

/// Answers 401 without the session cookie, like the analytics server does.
fn guarded(headers: &HeaderMap, body: Value) -> Response {
    if authorized(headers) {
        Json(body).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
    }
}

fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream");
    listener.set_nonblocking(true).expect("nonblocking upstream");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("upstream runtime");
        runtime.block_on(async move {
            let app = Router::new()
                .route(
                    "/api/heatmap-data",
                    get(|headers: HeaderMap| async move {
                        guarded(
                            &headers,
                            json!({
                                "points": [{ "x": 120, "y": 80, "intensity": 0.9 }],
                                "total_clicks": 17,
                                "clusters": 2
                            }),
                        )
                    }),
                )
                .route(
                    "/api/scroll-data",
                    get(|headers: HeaderMap| async move {
                        guarded(
                            &headers,
                            json!({
                                "average_depth": 42.5,
                                "max_depth": 100,
                                "bounce_rate": 12,
                                "depth_distribution": [5, 4, 3, 2, 1, 1, 1, 0, 0, 0]
                            }),
                        )
                    }),
                )
                .route(
                    "/api/suggestions",
                    get(|headers: HeaderMap| async move {
                        guarded(
                            &headers,
                            json!({
                                "suggestions": [{
                                    "title": "Move the checkout button up",
                                    "description": "Most sessions never scroll past 40%.",
                                    "priority": "high",
                                    "actionable_tips": ["Place it above the fold"]
                                }]
                            }),
                        )
                    }),
                )
                .route(
                    "/api/export-data",
                    get(|headers: HeaderMap| async move { guarded(&headers, export_payload()) }),
                );
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    base_url
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(api_base_url: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_ux_pulse"))
        .env("PORT", port.to_string())
        .env("UX_API_BASE_URL", api_base_url)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(&UPSTREAM).await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Points at a port nothing listens on.
async fn degraded_server() -> Arc<TestServer> {
    let mut guard = DEGRADED_SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let dead = format!("http://127.0.0.1:{}", pick_free_port());
    let server = Arc::new(spawn_server(&dead).await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_dashboard_renders_upstream_data() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/", server.base_url))
        .header(header::COOKIE, SESSION_COOKIE)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains(r#"<meta http-equiv="refresh" content="30" />"#));
    assert!(html.contains("Move the checkout button up"));
    assert!(html.contains(r#"class="suggestion-card high-priority""#));
    assert!(html.contains(r#"stop-color="rgb(255, 51, 51)""#));
    assert!(html.contains(r#"id="total-clicks">17<"#));
    assert!(html.contains(r#"id="avg-scroll-depth">42.5%<"#));
    assert!(html.contains(r#"id="total-events">3<"#));
    assert!(html.contains(r#"id="unique-sessions">2<"#));
    assert!(html.contains(r#""element_id":"scrollChart""#));
    assert!(html.contains(r#"href="/export""#));
}

#[tokio::test]
async fn http_export_downloads_pretty_json() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/export", server.base_url))
        .header(header::COOKIE, SESSION_COOKIE)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with(r#"attachment; filename="ux-analytics-data-"#));
    assert!(disposition.ends_with(r#".json""#));

    let body = response.text().await.unwrap();
    assert!(body.contains("\n  \"events\": ["));
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, export_payload());
}

#[tokio::test]
async fn http_dead_upstream_degrades_every_panel() {
    let _guard = TEST_LOCK.lock().await;
    let server = degraded_server().await;
    let client = Client::new();

    let response = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("No click data available yet"));
    assert!(html.contains("No suggestions available yet."));
    assert!(html.contains(r#"id="total-clicks">0<"#));
    assert!(html.contains(r#"id="bounce-rate">0%<"#));
    assert!(html.contains(r#"id="total-events">0<"#));

    let export = client
        .get(format!("{}/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(export.status(), StatusCode::BAD_GATEWAY);
    assert!(export
        .text()
        .await
        .unwrap()
        .contains("Failed to export data. Please try again."));
}

#[tokio::test]
async fn http_requests_without_session_degrade() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("No click data available yet"));
    assert!(!html.contains(r#"id="total-clicks">17<"#));

    let export = client
        .get(format!("{}/export", server.base_url))
        .header(header::COOKIE, "session=anonymous")
        .send()
        .await
        .unwrap();
    assert_eq!(export.status(), StatusCode::BAD_GATEWAY);
}
