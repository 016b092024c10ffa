//! In-test stand-in for the hosted key-value REST service.
//!
//! Understands the six commands the remote backend sends, stores values as
//! text the way the real service does, and rejects requests whose bearer
//! token does not match.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use crowe_core::backend::RemoteBackend;
use crowe_core::{KvBackend, KvStore, ManualClock};
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub const TOKEN: &str = "test-token";

#[derive(Default)]
struct Keyspace {
    hashes: HashMap<String, HashMap<String, String>>,
    lists: HashMap<String, VecDeque<String>>,
}

#[derive(Clone, Default)]
pub struct FakeKv {
    data: Arc<Mutex<Keyspace>>,
}

impl FakeKv {
    pub async fn list_len(&self, key: &str) -> usize {
        self.data.lock().await.lists.get(key).map_or(0, VecDeque::len)
    }

    pub async fn raw_field(&self, key: &str, field: &str) -> Option<String> {
        self.data
            .lock()
            .await
            .hashes
            .get(key)
            .and_then(|h| h.get(field))
            .cloned()
    }

    pub async fn put_raw_field(&self, key: &str, field: &str, text: &str) {
        self.data
            .lock()
            .await
            .hashes
            .entry(key.to_owned())
            .or_default()
            .insert(field.to_owned(), text.to_owned());
    }

    pub async fn push_raw(&self, key: &str, text: &str) {
        self.data
            .lock()
            .await
            .lists
            .entry(key.to_owned())
            .or_default()
            .push_front(text.to_owned());
    }
}

/// Spawn the fake service on an ephemeral port and return its handle and URL.
pub async fn spawn_fake_kv() -> (FakeKv, String) {
    let kv = FakeKv::default();
    let router = Router::new()
        .route("/", post(handle))
        .with_state(kv.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (kv, format!("http://{addr}"))
}

/// A store over the fake service, with a deterministic clock.
pub async fn remote_store() -> (FakeKv, KvStore) {
    let (kv, url) = spawn_fake_kv().await;
    let backend: Arc<dyn KvBackend> = Arc::new(RemoteBackend::new(&url, TOKEN).unwrap());
    let store = KvStore::new(backend).with_clock(Arc::new(ManualClock::new(1_000, 1)));
    (kv, store)
}

pub fn memory_store() -> KvStore {
    KvStore::in_memory().with_clock(Arc::new(ManualClock::new(1_000, 1)))
}

/// Redis inclusive-range semantics over a list of `len` items.
fn span(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    (start <= end && start < len).then(|| (start as usize, end as usize))
}

async fn handle(
    State(kv): State<FakeKv>,
    headers: HeaderMap,
    Json(cmd): Json<Vec<String>>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        );
    }

    let mut data = kv.data.lock().await;
    let arg = |i: usize| cmd.get(i).cloned().unwrap_or_default();
    let num = |i: usize| arg(i).parse::<i64>().unwrap_or(0);

    let result = match arg(0).to_ascii_uppercase().as_str() {
        "HSET" => {
            let fresh = data
                .hashes
                .entry(arg(1))
                .or_default()
                .insert(arg(2), arg(3))
                .is_none();
            json!(u8::from(fresh))
        }
        "HGET" => json!(data.hashes.get(&arg(1)).and_then(|h| h.get(&arg(2)))),
        "HGETALL" => {
            let flat: Vec<&String> = data
                .hashes
                .get(&arg(1))
                .into_iter()
                .flatten()
                .flat_map(|(k, v)| [k, v])
                .collect();
            json!(flat)
        }
        "LPUSH" => {
            let list = data.lists.entry(arg(1)).or_default();
            list.push_front(arg(2));
            json!(list.len())
        }
        "LRANGE" => {
            let list = data.lists.get(&arg(1)).cloned().unwrap_or_default();
            let items: Vec<String> = match span(list.len(), num(2), num(3)) {
                Some((s, e)) => list.range(s..=e).cloned().collect(),
                None => Vec::new(),
            };
            json!(items)
        }
        "LTRIM" => {
            let key = arg(1);
            let len = data.lists.get(&key).map_or(0, VecDeque::len);
            match span(len, num(2), num(3)) {
                Some((s, e)) => {
                    if let Some(list) = data.lists.get_mut(&key) {
                        let kept: VecDeque<String> = list.drain(s..=e).collect();
                        *list = kept;
                    }
                }
                None => {
                    data.lists.remove(&key);
                }
            }
            json!("OK")
        }
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("ERR unknown command '{other}'")})),
            );
        }
    };
    (StatusCode::OK, Json(json!({ "result": result })))
}
