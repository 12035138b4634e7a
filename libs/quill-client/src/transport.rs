use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value as Json;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP/JSON seam used by [`Session`](crate::Session) and
/// [`Transaction`](crate::Transaction) for every server call.
///
/// `path` is relative to the API base and starts with `/v1/`.
/// Implementations map any status outside `[200, 300)` to
/// [`ClientError::Remote`] and never retry.
pub trait Transport: Send + Sync {
    /// POST a JSON body, returning the JSON response (`{}` for an empty body).
    fn post<'a>(&'a self, path: &'a str, body: Json) -> BoxFuture<'a, ClientResult<Json>>;

    fn delete<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ClientResult<()>>;
}

// ═══════════════════════════════════════════════════════════════
//  reqwest transport
// ═══════════════════════════════════════════════════════════════

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<String> {
        let resp = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("request: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("read: {e}")))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Remote(format!("{status}: {body}")))
        }
    }
}

impl Transport for HttpTransport {
    fn post<'a>(&'a self, path: &'a str, body: Json) -> BoxFuture<'a, ClientResult<Json>> {
        Box::pin(async move {
            tracing::debug!(path, "POST");
            let payload = serde_json::to_vec(&body)?;
            let request = self
                .http
                .post(self.url(path))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload);
            let text = self.send(request).await?;
            parse_body(&text)
        })
    }

    fn delete<'a>(&'a self, path: &'a str) -> BoxFuture<'a, ClientResult<()>> {
        Box::pin(async move {
            tracing::debug!(path, "DELETE");
            self.send(self.http.delete(self.url(path))).await?;
            Ok(())
        })
    }
}

fn parse_body(text: &str) -> ClientResult<Json> {
    if text.trim().is_empty() {
        return Ok(Json::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text).map_err(|e| ClientError::Remote(format!("unrecognized response: {e}")))
}
