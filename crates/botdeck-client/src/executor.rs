//! Request executor
//!
//! Every remote call the dashboard makes goes through [`DashboardClient::execute`]:
//!
//! - resolve the target against the configured base address
//! - attach the bearer token from the injected [`IdentityStore`]
//! - bound the attempt with a hard deadline
//! - on 401, invalidate the identity and retry exactly once
//! - on transport failure, answer from the fallback table instead of erroring
//!
//! Network-class failures therefore never reach the UI as errors; only
//! malformed call construction does.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use botdeck_auth::IdentityStore;

use crate::config::{normalize_base_url, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::fallback;

/// Options for a single call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method
    pub method: Method,
    /// Caller-supplied headers; they win over the defaults on conflict
    pub headers: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// A real server response, whatever its status
    Server,
    /// Synthesized locally after a transport failure
    Fallback,
}

/// The outcome of one executed call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiReply {
    /// HTTP status (200 for synthesized replies)
    pub status: u16,
    /// Parsed JSON body; non-JSON bodies are wrapped as `{"raw": <text>}`
    pub body: Value,
    /// Server or fallback
    pub source: ReplySource,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_simulated(&self) -> bool {
        self.source == ReplySource::Fallback
    }
}

/// The dashboard's resilient HTTP client
pub struct DashboardClient {
    config: ClientConfig,
    http: reqwest::Client,
    identity: Arc<IdentityStore>,
}

impl DashboardClient {
    /// Build a client over an injected identity store.
    pub fn new(config: ClientConfig, identity: Arc<IdentityStore>) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Construction(e.to_string()))?;

        Ok(Self {
            config: ClientConfig { base_url, ..config },
            http,
            identity,
        })
    }

    /// Build a client from `BOTDECK_*` environment variables.
    pub fn from_env(identity: Arc<IdentityStore>) -> ClientResult<Self> {
        Self::new(ClientConfig::from_env(), identity)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<IdentityStore> {
        &self.identity
    }

    /// Execute one call. Resolves with a value for every network outcome;
    /// `Err` is reserved for malformed call construction.
    pub async fn execute(&self, path: &str, options: RequestOptions) -> ClientResult<ApiReply> {
        let url = self.resolve_url(path);
        // Programmer errors surface before the first attempt.
        let caller_headers = build_headers(&options.headers)?;

        let token = self.identity.get_or_create().await;
        let reply = match self
            .attempt(&url, &options, &caller_headers, token.as_str())
            .await
        {
            Ok(reply) if reply.status == StatusCode::UNAUTHORIZED.as_u16() => {
                tracing::debug!(%url, "unauthorized, refreshing identity and retrying once");
                self.identity.invalidate().await;
                let fresh = self.identity.get_or_create().await;
                match self
                    .attempt(&url, &options, &caller_headers, fresh.as_str())
                    .await
                {
                    // A second 401 is returned as-is; there is never a second retry.
                    Ok(reply) => reply,
                    Err(err) => self.degrade(path, &options.method, &err),
                }
            }
            Ok(reply) => reply,
            Err(err) => self.degrade(path, &options.method, &err),
        };

        Ok(reply)
    }

    /// One attempt, with its own full deadline. The 401 retry deliberately
    /// does not share the first attempt's deadline.
    async fn attempt(
        &self,
        url: &str,
        options: &RequestOptions,
        caller_headers: &HeaderMap,
        token: &str,
    ) -> Result<ApiReply, reqwest::Error> {
        let mut headers = caller_headers.clone();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if !headers.contains_key(AUTHORIZATION) {
            // Tokens are base64url segments, always a representable value.
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let mut request = self
            .http
            .request(options.method.clone(), url)
            .timeout(self.config.timeout)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }))
        };

        Ok(ApiReply {
            status,
            body,
            source: ReplySource::Server,
        })
    }

    fn degrade(&self, path: &str, method: &Method, err: &reqwest::Error) -> ApiReply {
        tracing::warn!(%path, error = %err, "transport failure, serving synthesized payload");
        ApiReply {
            status: 200,
            body: fallback::synthesize(path, method),
            source: ReplySource::Fallback,
        }
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.config.base_url, path)
        } else {
            format!("{}/{}", self.config.base_url, path)
        }
    }
}

fn build_headers(pairs: &[(String, String)]) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        // insert, not append: the last caller value for a name wins.
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::HeaderMap as AxumHeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    fn client_for(base_url: &str) -> DashboardClient {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        DashboardClient::new(config, Arc::new(IdentityStore::in_memory())).unwrap()
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A loopback address nothing is listening on.
    async fn dead_base_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn success_passes_through() {
        let app = Router::new().route(
            "/api/ping",
            get(|| async { Json(json!({ "pong": true })) }),
        );
        let base = serve(app).await;
        let client = client_for(&base);

        let reply = client
            .execute("/api/ping", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.source, ReplySource::Server);
        assert_eq!(reply.body["pong"], json!(true));
    }

    #[tokio::test]
    async fn unauthorized_triggers_exactly_one_retry_with_fresh_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/api/guarded",
                get(
                    |State(calls): State<Arc<AtomicUsize>>, headers: AxumHeaderMap| async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        let bearer = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        if n == 0 {
                            (
                                axum::http::StatusCode::UNAUTHORIZED,
                                Json(json!({ "error": "expired" })),
                            )
                        } else {
                            (
                                axum::http::StatusCode::OK,
                                Json(json!({ "ok": true, "bearer": bearer })),
                            )
                        }
                    },
                ),
            )
            .with_state(calls.clone());
        let base = serve(app).await;
        let client = client_for(&base);

        let before = client.identity().get_or_create().await;
        let reply = client
            .execute("/api/guarded", RequestOptions::get())
            .await
            .unwrap();
        let after = client.identity().get_or_create().await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.source, ReplySource::Server);
        assert_eq!(reply.body["ok"], json!(true));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // The retried attempt used a replacement token.
        assert_ne!(before.as_str(), after.as_str());
        assert_eq!(
            reply.body["bearer"],
            json!(format!("Bearer {}", after.as_str()))
        );
    }

    #[tokio::test]
    async fn sustained_unauthorized_stops_after_two_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/api/guarded",
                get(|State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (
                        axum::http::StatusCode::UNAUTHORIZED,
                        Json(json!({ "error": "nope" })),
                    )
                }),
            )
            .with_state(calls.clone());
        let base = serve(app).await;
        let client = client_for(&base);

        let reply = client
            .execute("/api/guarded", RequestOptions::get())
            .await
            .unwrap();

        // The second 401 comes back as-is.
        assert_eq!(reply.status, 401);
        assert_eq!(reply.source, ReplySource::Server);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn connection_refusal_serves_fallback() {
        let base = dead_base_url().await;
        let client = client_for(&base);

        let reply = client
            .execute("/api/environment", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.is_simulated());
        assert_eq!(reply.body["simulation_mode"], json!(true));
        // Project-info shape survives offline.
        assert!(reply.body["project"]["models_available"].as_u64().unwrap() > 0);
        assert!(reply.body["project"]["base_path"]
            .as_str()
            .unwrap()
            .starts_with('/'));
    }

    #[tokio::test]
    async fn deadline_overrun_is_a_network_failure() {
        let app = Router::new().route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({ "late": true }))
            }),
        );
        let base = serve(app).await;
        let config = ClientConfig {
            base_url: base,
            timeout: Duration::from_millis(50),
        };
        let client =
            DashboardClient::new(config, Arc::new(IdentityStore::in_memory())).unwrap();

        let reply = client
            .execute("/api/slow", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(reply.body["simulation_mode"], json!(true));
    }

    #[tokio::test]
    async fn other_http_errors_pass_through() {
        let app = Router::new().route(
            "/api/broken",
            get(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "boom" })),
                )
            }),
        );
        let base = serve(app).await;
        let client = client_for(&base);

        let reply = client
            .execute("/api/broken", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(reply.status, 500);
        assert_eq!(reply.source, ReplySource::Server);
        assert_eq!(reply.body["error"], json!("boom"));
    }

    #[tokio::test]
    async fn malformed_headers_are_programmer_errors() {
        let base = dead_base_url().await;
        let client = client_for(&base);

        let options = RequestOptions::get().with_header("bad header name", "x");
        let result = client.execute("/api/ping", options).await;

        assert!(matches!(
            result,
            Err(ClientError::InvalidHeader { .. })
        ));
    }

    #[tokio::test]
    async fn caller_headers_win_over_defaults() {
        let app = Router::new().route(
            "/api/echo",
            post(|headers: AxumHeaderMap| async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({ "content_type": content_type }))
            }),
        );
        let base = serve(app).await;
        let client = client_for(&base);

        let options = RequestOptions::post(json!({ "k": "v" }))
            .with_header("content-type", "application/vnd.botdeck+json");
        let reply = client.execute("/api/echo", options).await.unwrap();

        assert_eq!(
            reply.body["content_type"],
            json!("application/vnd.botdeck+json")
        );
    }

    #[tokio::test]
    async fn absolute_urls_skip_base_resolution() {
        let app = Router::new().route(
            "/api/ping",
            get(|| async { Json(json!({ "pong": true })) }),
        );
        let real_base = serve(app).await;
        let dead_base = dead_base_url().await;
        let client = client_for(&dead_base);

        let reply = client
            .execute(&format!("{real_base}/api/ping"), RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::Server);
        assert_eq!(reply.body["pong"], json!(true));
    }

    #[tokio::test]
    async fn concurrent_calls_have_independent_deadlines() {
        let app = Router::new()
            .route(
                "/api/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Json(json!({ "late": true }))
                }),
            )
            .route(
                "/api/fast",
                get(|| async { Json(json!({ "fast": true })) }),
            );
        let base = serve(app).await;
        let config = ClientConfig {
            base_url: base,
            timeout: Duration::from_millis(100),
        };
        let client = Arc::new(
            DashboardClient::new(config, Arc::new(IdentityStore::in_memory())).unwrap(),
        );

        let slow = {
            let client = client.clone();
            tokio::spawn(async move {
                client.execute("/api/slow", RequestOptions::get()).await
            })
        };
        let fast = {
            let client = client.clone();
            tokio::spawn(async move {
                client.execute("/api/fast", RequestOptions::get()).await
            })
        };

        let fast_reply = fast.await.unwrap().unwrap();
        let slow_reply = slow.await.unwrap().unwrap();

        // The slow call degrading has no effect on the fast one.
        assert_eq!(fast_reply.source, ReplySource::Server);
        assert_eq!(slow_reply.source, ReplySource::Fallback);
    }
}
