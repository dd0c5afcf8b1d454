//! Shared fixtures: a fake hub (axum) and a WebSocket listener.
//!
//! The hub runs on its own thread and runtime so blocking clients can call
//! it from plain `#[test]` functions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::{json, Value};
use telesync_client::Config;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub const KEY_ID: &str = "test-id";
pub const KEY_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct HubState {
    auth: String,
    pub patches: Mutex<Vec<(String, String)>>,
    pub pages: Mutex<HashMap<String, Value>>,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

pub struct FakeHub {
    pub address: String,
    pub state: Arc<HubState>,
}

impl FakeHub {
    pub fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(HubState {
            auth: basic_auth_header(KEY_ID, KEY_SECRET),
            ..HubState::default()
        });
        let app = Router::new()
            .route("/_f", post(upload))
            .route("/{*path}", get(fetch).patch(patch))
            .with_state(state.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self { address, state }
    }

    pub fn config(&self) -> Config {
        Config {
            hub_address: self.address.clone(),
            hub_access_key_id: KEY_ID.into(),
            hub_access_key_secret: KEY_SECRET.into(),
            ..Config::default()
        }
    }

    pub fn set_page(&self, url: &str, state: Value) {
        self.state.pages.lock().unwrap().insert(url.into(), state);
    }

    pub fn set_file(&self, url: &str, bytes: &[u8]) {
        self.state.files.lock().unwrap().insert(url.into(), bytes.to_vec());
    }

    pub fn patches(&self) -> Vec<(String, String)> {
        self.state.patches.lock().unwrap().clone()
    }

    pub fn file(&self, url: &str) -> Option<Vec<u8>> {
        self.state.files.lock().unwrap().get(url).cloned()
    }
}

fn basic_auth_header(id: &str, secret: &str) -> String {
    let request = reqwest::Client::new()
        .get("http://hub.invalid/")
        .basic_auth(id, Some(secret))
        .build()
        .unwrap();
    request.headers()[reqwest::header::AUTHORIZATION]
        .to_str()
        .unwrap()
        .to_string()
}

fn authorized(state: &HubState, headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.auth)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "bad credentials").into_response()
}

async fn patch(
    State(state): State<Arc<HubState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let json = headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == b"application/json");
    if !json {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected json").into_response();
    }
    state
        .patches
        .lock()
        .unwrap()
        .push((format!("/{path}"), body));
    StatusCode::OK.into_response()
}

async fn fetch(
    State(state): State<Arc<HubState>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let url = format!("/{path}");
    if let Some(bytes) = state.files.lock().unwrap().get(&url) {
        return Bytes::from(bytes.clone()).into_response();
    }
    match state.pages.lock().unwrap().get(&url) {
        Some(page) => Json(page.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no such page").into_response(),
    }
}

async fn upload(
    State(state): State<Arc<HubState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let mut urls = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("files") {
            continue;
        }
        let name = field.file_name().unwrap_or("file").to_string();
        let bytes = field.bytes().await.unwrap();
        let url = format!("/_f/{}/{name}", uuid::Uuid::new_v4());
        state.files.lock().unwrap().insert(url.clone(), bytes.to_vec());
        urls.push(url);
    }
    Json(json!({ "files": urls })).into_response()
}

/// Accept one WebSocket connection on a free port and forward its text
/// messages. The receiver yields `None` once the peer closes.
pub async fn start_ws_listener() -> (String, mpsc::Receiver<String>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("ws://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    if tx.send(text.as_str().to_string()).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    (address, rx)
}
