//! HTTP transport for the HMS REST API.
//!
//! One [`ApiClient`] is built at startup and shared (it is cheap to clone). It attaches the
//! bearer token and socket id from the [`Session`], maps failures onto [`ApiError`] and applies
//! the session-wide side effects of a failure: an expired session drops the stored credentials
//! and a maintenance response triggers the redirect hook.

use crate::config::ClientConfig;
use crate::download::{DirectorySink, DownloadSink};
use crate::error::{ApiError, ClientError, ClientResult, SideEffect};
use crate::session::Session;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Paths that authenticate the caller and so never carry a bearer token.
pub const AUTH_ENDPOINTS: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/auth/verify-email",
    "/auth/refresh-token",
];

pub const LOGIN_ROUTE: &str = "/login";
pub const MAINTENANCE_ROUTE: &str = "/maintenance";
pub const SOCKET_ID_HEADER: &str = "X-Socket-ID";

pub fn is_auth_endpoint(path: &str) -> bool {
    AUTH_ENDPOINTS.iter().any(|p| path.contains(p))
}

/// Called with [`LOGIN_ROUTE`] or [`MAINTENANCE_ROUTE`] when a response demands navigation.
pub type RedirectHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Query string pairs.
pub type Query<'a> = &'a [(&'a str, String)];

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: Session,
    sink: Arc<dyn DownloadSink>,
    on_redirect: Option<RedirectHook>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_root", &self.config.api_root())
            .finish_non_exhaustive()
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        tracing::warn!("request timed out: {err}");
        ApiError::timeout().into()
    } else {
        tracing::warn!("request failed without a response: {err}");
        ApiError::network().into()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        let sink = Arc::new(DirectorySink::new(config.download_dir().clone()));
        Ok(Self {
            http,
            config: Arc::new(config),
            session,
            sink,
            on_redirect: None,
        })
    }

    pub fn with_download_sink(mut self, sink: Arc<dyn DownloadSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_redirect_hook(mut self, hook: RedirectHook) -> Self {
        self.on_redirect = Some(hook);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_root(), path)
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let mut builder = self.http.request(method, self.url(path));
        if !is_auth_endpoint(path) {
            if let Some(token) = self.session.auth_token()? {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
        }
        if let Some(socket_id) = self.session.socket_id()? {
            builder = builder.header(SOCKET_ID_HEADER, socket_id);
        }
        Ok(builder)
    }

    fn redirect(&self, route: &str) {
        match &self.on_redirect {
            Some(hook) => hook(route),
            None => tracing::debug!("redirect to {route} requested"),
        }
    }

    fn apply(&self, effect: SideEffect) {
        match effect {
            SideEffect::None => {}
            SideEffect::ExpireSession => {
                if let Err(e) = self.session.clear_session() {
                    tracing::error!("failed to clear expired session: {e}");
                }
                self.redirect(LOGIN_ROUTE);
            }
            SideEffect::Maintenance => self.redirect(MAINTENANCE_ROUTE),
        }
    }

    /// Sends the request and turns any non-2xx status into an [`ApiError`].
    async fn send(&self, builder: RequestBuilder, method: &Method, path: &str) -> ClientResult<Response> {
        let started = Instant::now();
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        tracing::debug!(
            "API {method} {path} -> {} in {}ms",
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.unwrap_or_default();
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();
        let (err, effect) = ApiError::from_status(status.as_u16(), body.as_ref(), is_auth_endpoint(path));
        tracing::warn!("API {method} {path} failed: {} ({})", err.message, err.kind);
        self.apply(effect);
        Err(err.into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_value(Value::Null).map_err(ClientError::Decode);
        }
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }

    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method.clone(), path)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            let json = serde_json::to_value(body).map_err(ClientError::Encode)?;
            builder = builder.json(&json);
        }
        let response = self.send(builder, &method, path).await?;
        Self::decode(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute::<T, Value>(Method::GET, path, &[], None).await
    }

    pub async fn get_query<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> ClientResult<T> {
        self.execute::<T, Value>(Method::GET, path, query, None).await
    }

    /// GET for endpoints that wrap their payload as `{ "data": ... }`.
    pub async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let body: Value = self.get(path).await?;
        let payload = match body {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(payload).map_err(ClientError::Decode)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    /// POST without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute::<T, Value>(Method::POST, path, &[], None).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute::<T, Value>(Method::PATCH, path, &[], None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute::<T, Value>(Method::DELETE, path, &[], None).await
    }

    /// DELETE carrying a JSON body.
    pub async fn delete_with_body<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::DELETE, path, &[], Some(body)).await
    }

    /// Multipart POST with the longer upload timeout.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> ClientResult<T> {
        let builder = self
            .request(Method::POST, path)?
            .multipart(form)
            .timeout(self.config.upload_timeout());
        let response = self.send(builder, &Method::POST, path).await?;
        Self::decode(response).await
    }

    /// Fetches a file and hands the bytes to the download sink. Returns the saved path.
    pub async fn download(&self, path: &str, query: Query<'_>, filename: &str) -> ClientResult<PathBuf> {
        let mut builder = self.request(Method::GET, path)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let response = self.send(builder, &Method::GET, path).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        self.sink.save(filename, &bytes)
    }
}
