//! In-memory transport for unit tests.
//!
//! Scripted replies: sessions are named `{database}/sessions/sN`, transactions
//! `txn-N`. `executeSql` answers one INT64 column `seqno` echoing the request
//! seqno (`0` for single-use), and fails with `Remote` when the SQL contains
//! `boom`.
//!
//! [`LogCapture`] collects warnings emitted on the current thread.

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::{Value as Json, json};

use crate::client::Client;
use crate::error::{ClientError, ClientResult};
use crate::transport::{BoxFuture, Transport};

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Json,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    failing: Vec<String>,
    next_id: u64,
}

#[derive(Default)]
pub(crate) struct MockTransport {
    state: Mutex<State>,
}

impl MockTransport {
    pub fn client() -> (Client, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::default());
        let client = Client::with_transport("projects/p/instances/i/databases/d", mock.clone());
        (client, mock)
    }

    /// Fail every call whose method equals `pattern` or whose path ends with it.
    pub fn fail_on(&self, pattern: &str) {
        self.lock().failing.push(pattern.to_string());
    }

    /// POST calls whose path ends with `suffix`, in order.
    pub fn calls_to(&self, suffix: &str) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == "POST" && c.path.ends_with(suffix))
            .cloned()
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == "DELETE")
            .map(|c| c.path.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: &'static str, path: &str, body: Json) -> ClientResult<u64> {
        let mut state = self.lock();
        state.calls.push(Call {
            method,
            path: path.to_string(),
            body,
        });
        if state.failing.iter().any(|p| p == method || path.ends_with(p.as_str())) {
            return Err(ClientError::Remote(format!("500 Internal Server Error: {method} {path}")));
        }
        state.next_id += 1;
        Ok(state.next_id)
    }

    fn reply(path: &str, body: &Json, id: u64) -> ClientResult<Json> {
        if path.ends_with("/sessions") {
            let database = path.trim_start_matches("/v1/").trim_end_matches("/sessions");
            return Ok(json!({"name": format!("{database}/sessions/s{id}")}));
        }
        if path.ends_with(":beginTransaction") {
            return Ok(json!({"id": format!("txn-{id}")}));
        }
        if path.ends_with(":executeSql") {
            let sql = body["sql"].as_str().unwrap_or_default();
            if sql.contains("boom") {
                return Err(ClientError::Remote(format!("400 Bad Request: syntax error in '{sql}'")));
            }
            let seqno = body["seqno"].as_str().unwrap_or("0");
            return Ok(json!({
                "metadata": {"rowType": {"fields": [{"name": "seqno", "type": {"code": "INT64"}}]}},
                "rows": [[seqno]]
            }));
        }
        Ok(json!({}))
    }
}

impl Transport for MockTransport {
    fn post<'a>(&'a self, path: &'a str, body: Json) -> BoxFuture<'a, ClientResult<Json>> {
        Box::pin(async move {
            let id = self.record("POST", path, body.clone())?;
            Self::reply(path, &body, id)
        })
    }

    fn delete<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ClientResult<()>> {
        Box::pin(async move {
            self.record("DELETE", path, Json::Null)?;
            Ok(())
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Log capture
// ═══════════════════════════════════════════════════════════════

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Thread-local WARN-and-above subscriber. `#[tokio::test]` runs on one
/// thread, so everything the test body logs lands here.
pub(crate) struct LogCapture {
    buf: SharedBuf,
    _guard: tracing::subscriber::DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        Self {
            buf,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn output(&self) -> String {
        let bytes = self.buf.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
