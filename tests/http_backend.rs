use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use reqwest::Client;
use serde_json::{Value, json};

use pylearn_client::backend::{CSRF_HEADER, HttpBackend};
use pylearn_client::config::{ClientConfig, PageContext};
use pylearn_client::handlers::{self, AuthError, ChatOutcome, LoginForm, Redirect, RegisterForm};
use pylearn_client::surface::{BufferChatView, BufferSurface};
use pylearn_client::AppState;

#[derive(Clone, Default)]
struct Seen {
    csrf: Arc<Mutex<Vec<(&'static str, Option<String>)>>>,
    code: Arc<Mutex<Vec<String>>>,
}

impl Seen {
    fn record(&self, path: &'static str, headers: &HeaderMap) {
        let token = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.csrf.lock().unwrap().push((path, token));
    }

    fn tokens(&self) -> Vec<(&'static str, Option<String>)> {
        self.csrf.lock().unwrap().clone()
    }
}

fn token(value: &str) -> Option<String> {
    Some(value.to_string())
}

async fn run_code(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    seen.record("/run_code", &headers);
    let code = body["code"].as_str().unwrap_or_default().to_string();
    seen.code.lock().unwrap().push(code.clone());

    match code.as_str() {
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Sandbox error" })),
        ),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, Json(json!({ "output": "late" })))
        }
        _ => (
            StatusCode::OK,
            Json(json!({ "output": format!("<b>ran</b> {}", code) })),
        ),
    }
}

async fn chatgpt(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    seen.record("/chatgpt", &headers);
    let message = body["message"].as_str().unwrap_or_default();
    if message == "quota" {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "You have reached the daily usage limit." })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "reply": format!("<p>echo: {}</p>", message) })),
    )
}

async fn login(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    seen.record("/login", &headers);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            Json(json!({ "status": "error", "message": "Email or password missing" })),
        );
    }
    if password != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            HeaderMap::new(),
            Json(json!({ "status": "error", "message": "Invalid email or password" })),
        );
    }
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, "session=abc; Path=/".parse().unwrap());
    (
        StatusCode::OK,
        headers,
        Json(json!({ "status": "success", "message": "Login successful" })),
    )
}

async fn register(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    seen.record("/register", &headers);
    if body["username"].as_str() == Some("taken") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "Username already exists" })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({ "status": "success", "message": "User registered successfully" })),
    )
}

async fn profile(headers: HeaderMap) -> impl IntoResponse {
    let logged_in = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("session=abc"));
    if !logged_in {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "User not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "user": {
                "username": "ana",
                "email": "ana@example.com",
                "tier_name": "standard",
                "query_count": 4
            }
        })),
    )
}

async fn spawn_service(seen: Seen) -> String {
    let app = Router::new()
        .route("/run_code", post(run_code))
        .route("/chatgpt", post(chatgpt))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/get_user_profile", get(profile))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn session(base_url: &str, exec_timeout: Duration) -> AppState {
    session_with_page(
        base_url,
        exec_timeout,
        PageContext {
            csrf_token: Some("tok-123".into()),
            user_id: Some("ana".into()),
        },
    )
}

fn session_with_page(base_url: &str, exec_timeout: Duration, page: PageContext) -> AppState {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        page,
        exec_timeout,
        ..ClientConfig::default()
    };
    let client = Client::builder()
        .no_proxy()
        .cookie_store(true)
        .build()
        .unwrap();
    let backend = HttpBackend::with_client(client, &config.base_url, &config.page);
    AppState::with_backend(&config, Arc::new(backend))
}

#[tokio::test]
async fn run_code_round_trip_sends_csrf_and_sanitizes() {
    let seen = Seen::default();
    let base = spawn_service(seen.clone()).await;
    let state = session(&base, Duration::from_secs(5));
    let mut surface = BufferSurface::new();

    let text = state.run_code("print(1)", &mut surface).await.unwrap();

    assert_eq!(text, "ran print(1)");
    assert_eq!(surface.text, "ran print(1)");
    assert_eq!(seen.tokens(), vec![("/run_code", token("tok-123"))]);
    assert_eq!(seen.code.lock().unwrap().as_slice(), ["print(1)"]);
}

#[tokio::test]
async fn blocked_code_sends_nothing() {
    let seen = Seen::default();
    let base = spawn_service(seen.clone()).await;
    let state = session(&base, Duration::from_secs(5));
    let mut surface = BufferSurface::new();

    state.run_code("__import__('os')", &mut surface).await.unwrap_err();

    assert_eq!(surface.text, "Error: Forbidden keyword or operation: __import__");
    assert!(seen.code.lock().unwrap().is_empty());
}

#[tokio::test]
async fn server_failure_status_text() {
    let base = spawn_service(Seen::default()).await;
    let state = session(&base, Duration::from_secs(5));
    let mut surface = BufferSurface::new();

    state.run_code("boom", &mut surface).await.unwrap_err();
    assert_eq!(surface.text, "Error: Server error: Internal Server Error");
}

#[tokio::test]
async fn slow_execution_times_out() {
    let base = spawn_service(Seen::default()).await;
    let state = session(&base, Duration::from_millis(200));
    let mut surface = BufferSurface::new();

    let started = std::time::Instant::now();
    state.run_code("slow", &mut surface).await.unwrap_err();

    assert_eq!(surface.text, "Error: Execution timeout");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn chat_over_http() {
    let base = spawn_service(Seen::default()).await;
    let state = session(&base, Duration::from_secs(5));
    let mut view = BufferChatView::new();

    assert_eq!(state.chat.send("hello", &mut view).await, ChatOutcome::Replied);
    assert_eq!(view.last().unwrap().content(), "<p>echo: hello</p>");

    assert_eq!(state.chat.send("quota", &mut view).await, ChatOutcome::Failed);
    assert_eq!(
        view.last().unwrap().content(),
        "Error: You have reached the daily usage limit!"
    );
    assert!(view.input_enabled);
}

#[tokio::test]
async fn login_cookie_carries_into_profile() {
    let base = spawn_service(Seen::default()).await;
    let state = session(&base, Duration::from_secs(5));
    let backend = state.backend.as_ref();

    assert_eq!(
        handlers::profile(backend).await.unwrap_err().to_string(),
        "Failed to load user profile."
    );

    let wrong = LoginForm {
        email: "ana@example.com".into(),
        password: "nope".into(),
    };
    assert_eq!(
        handlers::login(backend, &wrong).await.unwrap_err().to_string(),
        "Login failed: Invalid email or password"
    );

    let right = LoginForm {
        email: "ana@example.com".into(),
        password: "secret".into(),
    };
    handlers::login(backend, &right).await.unwrap();

    let card = handlers::profile(backend).await.unwrap();
    assert_eq!(card.username, "ana");
    assert_eq!(card.remaining_queries, 16);
}

fn register_form(username: &str) -> RegisterForm {
    RegisterForm {
        email: format!("{}@example.com", username),
        username: username.into(),
        password: "pw".into(),
        confirm_password: "pw".into(),
    }
}

#[tokio::test]
async fn register_over_http() {
    let seen = Seen::default();
    let base = spawn_service(seen.clone()).await;
    let state = session(&base, Duration::from_secs(5));
    let backend = state.backend.as_ref();

    assert_eq!(
        handlers::register(backend, &register_form("bea")).await,
        Ok(Redirect("/login"))
    );

    let err = handlers::register(backend, &register_form("taken"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::RegistrationRejected("Username already exists".into())
    );
    assert_eq!(err.to_string(), "Registration failed: Username already exists");

    assert_eq!(
        seen.tokens(),
        vec![
            ("/register", token("tok-123")),
            ("/register", token("tok-123")),
        ]
    );
}

#[tokio::test]
async fn csrf_token_sent_on_every_post() {
    let seen = Seen::default();
    let base = spawn_service(seen.clone()).await;
    let state = session(&base, Duration::from_secs(5));
    let mut view = BufferChatView::new();

    state.chat.send("hello", &mut view).await;
    let form = LoginForm {
        email: "ana@example.com".into(),
        password: "secret".into(),
    };
    handlers::login(state.backend.as_ref(), &form).await.unwrap();

    assert_eq!(
        seen.tokens(),
        vec![("/chatgpt", token("tok-123")), ("/login", token("tok-123"))]
    );
}

#[tokio::test]
async fn csrf_header_omitted_without_token() {
    let seen = Seen::default();
    let base = spawn_service(seen.clone()).await;
    let state = session_with_page(&base, Duration::from_secs(5), PageContext::default());
    let mut surface = BufferSurface::new();

    state.run_code("print(2)", &mut surface).await.unwrap();
    handlers::register(state.backend.as_ref(), &register_form("cal"))
        .await
        .unwrap();

    assert_eq!(
        seen.tokens(),
        vec![("/run_code", None), ("/register", None)]
    );
}
