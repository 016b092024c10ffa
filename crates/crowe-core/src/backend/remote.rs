//! Hosted key-value backend.
//!
//! Every operation is a single REST call: the command is `POST`ed as a JSON
//! array of strings with a bearer token, and the service replies with
//! `{"result": …}` or `{"error": "…"}`. Records are stored as JSON text.
//!
//! Network failures, rejected credentials and refused commands all surface
//! as [`CoreError::BackendUnavailable`]. There are no retries here. Bulk reads
//! drop entries that are not JSON text; a single-field read reports them.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{BackendKind, KvBackend};
use crate::error::{CoreError, Result};

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// REST client for the hosted store.
#[derive(Clone)]
pub struct RemoteBackend {
    endpoint: Url,
    token: String,
    client: Client,
}

impl std::fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteBackend {
    pub fn new(url: &str, token: &str) -> Result<Self> {
        let endpoint = Url::parse(url)
            .map_err(|e| CoreError::InvalidConfig(format!("remote store url {url:?}: {e}")))?;
        let client = Client::builder()
            .user_agent(concat!("crowe-core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            endpoint,
            token: token.to_owned(),
            client,
        })
    }

    /// Send one command and return its `result` value.
    async fn command(&self, args: &[&str]) -> Result<Value> {
        let verb = args.first().copied().unwrap_or_default();
        debug!(command = verb, key = args.get(1).copied().unwrap_or_default(), "remote command");

        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| {
                warn!(command = verb, error = %e, "remote store unreachable");
                CoreError::unavailable(format!("{verb}: {e}"))
            })?;

        let status = resp.status();
        let body = resp.text().await?;
        let reply: Option<RestReply> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let detail = reply
                .and_then(|r| r.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
            warn!(command = verb, status = status.as_u16(), detail = %detail, "remote store rejected command");
            return Err(CoreError::unavailable(format!(
                "{verb}: {} {detail}",
                status.as_u16()
            )));
        }

        match reply {
            Some(RestReply { error: Some(e), .. }) => {
                Err(CoreError::unavailable(format!("{verb}: {e}")))
            }
            Some(RestReply { result, .. }) => Ok(result),
            None => Err(CoreError::unavailable(format!(
                "{verb}: malformed reply from remote store"
            ))),
        }
    }
}

fn decode_text(raw: Value) -> Result<Value> {
    match raw {
        Value::String(text) => Ok(serde_json::from_str(&text)?),
        other => Err(CoreError::unavailable(format!(
            "expected a stored string, got {other}"
        ))),
    }
}

fn into_array(raw: Value) -> Result<Vec<Value>> {
    match raw {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(CoreError::unavailable(format!(
            "expected an array reply, got {other}"
        ))),
    }
}

#[async_trait]
impl KvBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn get_field(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        match self.command(&["HGET", collection, id]).await? {
            Value::Null => Ok(None),
            raw => decode_text(raw).map(Some),
        }
    }

    async fn set_field(&self, collection: &str, id: &str, record: Value) -> Result<()> {
        let text = serde_json::to_string(&record)?;
        self.command(&["HSET", collection, id, &text]).await?;
        Ok(())
    }

    async fn get_all(&self, collection: &str) -> Result<HashMap<String, Value>> {
        let flat = into_array(self.command(&["HGETALL", collection]).await?)?;
        let mut out = HashMap::with_capacity(flat.len() / 2);
        let mut it = flat.into_iter();
        while let (Some(field), Some(raw)) = (it.next(), it.next()) {
            let Value::String(field) = field else {
                return Err(CoreError::unavailable("non-string hash field in reply"));
            };
            match decode_text(raw) {
                Ok(value) => {
                    out.insert(field, value);
                }
                Err(e) => warn!(collection, field = %field, error = %e, "skipping undecodable entry"),
            }
        }
        Ok(out)
    }

    async fn push_front(&self, list_key: &str, record: Value) -> Result<()> {
        let text = serde_json::to_string(&record)?;
        self.command(&["LPUSH", list_key, &text]).await?;
        Ok(())
    }

    async fn read_range(&self, list_key: &str, start: i64, end: i64) -> Result<Vec<Value>> {
        let (start, end) = (start.to_string(), end.to_string());
        let items = into_array(self.command(&["LRANGE", list_key, &start, &end]).await?)?;
        Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match decode_text(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(list_key, index, error = %e, "skipping undecodable entry");
                    None
                }
            })
            .collect())
    }

    async fn trim(&self, list_key: &str, start: i64, end: i64) -> Result<()> {
        let (start, end) = (start.to_string(), end.to_string());
        self.command(&["LTRIM", list_key, &start, &end]).await?;
        Ok(())
    }
}
