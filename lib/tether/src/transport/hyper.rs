//! Default transport on hyper-util's pooled client.

use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use cookie_store::CookieStore;
use http::HeaderMap;
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower_service::Service;
use tracing::debug;

use crate::{
    ClientConfig, Error, Result, Transport, TransportFuture, TransportRequest, TransportResponse,
};

/// HTTPS connector with rustls and the Mozilla root store.
///
/// Speaks HTTP/1.1 and HTTP/2 (negotiated with ALPN), and plain HTTP.
fn https_connector() -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build()
}

/// Connection pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// How long an idle connection is kept.
    pub idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 32,
        }
    }
}

/// [`Transport`] backed by a hyper-util client.
///
/// Cloning shares the connection pool. [`Transport::session`] builds a new
/// client with its own pool.
///
/// With a cookie store (see [`ClientConfig::should_set_cookies`]) every
/// `Set-Cookie` response header is stored and matching cookies are sent back
/// in a `Cookie` header. Clones share the store; sessions get a fresh one.
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    pool: PoolSettings,
    cookies: Option<Arc<Mutex<CookieStore>>>,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("pool", &self.pool)
            .field("cookies", &self.cookies.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Create a transport with default pool settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pool(PoolSettings::default())
    }

    /// Create a transport with the given pool settings.
    #[must_use]
    pub fn with_pool(pool: PoolSettings) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(pool.idle_timeout)
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .build(https_connector());

        Self {
            inner,
            pool,
            cookies: None,
        }
    }

    /// Create a transport following `config`'s cookie setting.
    #[must_use]
    pub fn for_config(config: &ClientConfig) -> Self {
        let transport = Self::new();
        if config.should_set_cookies {
            transport.with_cookie_store()
        } else {
            transport
        }
    }

    /// Keep cookies across calls in a fresh store.
    #[must_use]
    pub fn with_cookie_store(mut self) -> Self {
        self.cookies = Some(Arc::default());
        self
    }

    /// `true` when this transport keeps cookies.
    #[must_use]
    pub const fn has_cookie_store(&self) -> bool {
        self.cookies.is_some()
    }

    /// Pool settings in use.
    #[must_use]
    pub const fn pool(&self) -> PoolSettings {
        self.pool
    }

    fn build_hyper_request(request: TransportRequest) -> Result<http::Request<Full<Bytes>>> {
        let mut url = request.url;
        url.set_fragment(None);
        let mut builder = http::Request::builder()
            .method(http::Method::from(request.method))
            .uri(url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = request.body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn lock_cookies(jar: &Mutex<CookieStore>) -> std::sync::MutexGuard<'_, CookieStore> {
        jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `Cookie` header value for `url`, if the store holds matching cookies.
    fn cookie_header(jar: &Mutex<CookieStore>, url: &url::Url) -> Option<String> {
        let value = Self::lock_cookies(jar)
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        (!value.is_empty()).then_some(value)
    }

    fn store_cookies(jar: &Mutex<CookieStore>, headers: &HeaderMap, url: &url::Url) {
        let mut store = Self::lock_cookies(jar);
        for value in headers.get_all(http::header::SET_COOKIE) {
            let Ok(cookie) = value.to_str() else {
                continue;
            };
            if let Err(err) = store.parse(cookie, url) {
                debug!(url = %url, error = %err, "rejected cookie");
            }
        }
    }

    async fn execute(&self, mut request: TransportRequest) -> Result<TransportResponse> {
        let timeout = request.timeout;
        let url = request.url.clone();
        if let Some(jar) = &self.cookies {
            let has_cookie = request
                .headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("cookie"));
            if !has_cookie
                && let Some(value) = Self::cookie_header(jar, &url)
            {
                request.headers.push(("Cookie".to_string(), value));
            }
        }
        let hyper_request = Self::build_hyper_request(request)?;

        let response = tokio::time::timeout(timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        if let Some(jar) = &self.cookies {
            Self::store_cookies(jar, &headers, &url);
        }

        let body = tokio::time::timeout(timeout, response.into_body().collect())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await })
    }

    fn session(&self, config: &ClientConfig) -> Arc<dyn Transport> {
        let session = Self::with_pool(self.pool);
        if config.should_set_cookies {
            Arc::new(session.with_cookie_store())
        } else {
            Arc::new(session)
        }
    }
}

impl Service<TransportRequest> for HyperTransport {
    type Response = TransportResponse;
    type Error = Error;
    type Future = TransportFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: TransportRequest) -> Self::Future {
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn pool_defaults() {
        let pool = PoolSettings::default();
        assert_eq!(pool.idle_timeout, Duration::from_secs(90));
        assert_eq!(pool.max_idle_per_host, 32);
    }

    #[test]
    fn session_keeps_pool_settings() {
        let pool = PoolSettings {
            idle_timeout: Duration::from_secs(5),
            max_idle_per_host: 2,
        };
        let transport = HyperTransport::with_pool(pool);
        let _session = transport.session(&ClientConfig::default());
        assert_eq!(transport.pool(), pool);
    }

    #[test]
    fn builds_hyper_request() {
        let request = TransportRequest {
            method: Method::Post,
            url: url::Url::parse("https://api.example.com/items?x=1#top").expect("valid URL"),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(Bytes::from_static(b"{}")),
            timeout: Duration::from_secs(1),
        };

        let hyper_request = HyperTransport::build_hyper_request(request).expect("valid request");
        assert_eq!(hyper_request.method(), &http::Method::POST);
        assert_eq!(hyper_request.uri(), "https://api.example.com/items?x=1");
        assert_eq!(
            hyper_request.headers().get("content-type").map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
    }

    #[test]
    fn rejects_invalid_header_name() {
        let request = TransportRequest {
            method: Method::Get,
            url: url::Url::parse("https://api.example.com").expect("valid URL"),
            headers: vec![("bad header".to_string(), "x".to_string())],
            body: None,
            timeout: Duration::from_secs(1),
        };

        let err = HyperTransport::build_hyper_request(request).expect_err("invalid header");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn cookie_store_follows_config() {
        assert!(!HyperTransport::for_config(&ClientConfig::default()).has_cookie_store());

        let config = ClientConfig::builder().should_set_cookies(true).build();
        assert!(HyperTransport::for_config(&config).has_cookie_store());
    }

    #[test]
    fn stores_and_replays_cookies() {
        let jar = Mutex::new(CookieStore::default());
        let login = url::Url::parse("https://api.example.com/login").expect("valid URL");
        let mut headers = HeaderMap::new();
        headers.append(
            http::header::SET_COOKIE,
            http::HeaderValue::from_static("session=abc; Path=/"),
        );
        headers.append(
            http::header::SET_COOKIE,
            http::HeaderValue::from_static("theme=dark; Path=/"),
        );
        HyperTransport::store_cookies(&jar, &headers, &login);

        let profile = url::Url::parse("https://api.example.com/profile").expect("valid URL");
        let value = HyperTransport::cookie_header(&jar, &profile).expect("cookies stored");
        assert!(value.contains("session=abc"));
        assert!(value.contains("theme=dark"));

        let other = url::Url::parse("https://other.example.org/").expect("valid URL");
        assert_eq!(HyperTransport::cookie_header(&jar, &other), None);
    }

    #[test]
    fn transport_is_debug() {
        let debug = format!("{:?}", HyperTransport::new());
        assert!(debug.contains("HyperTransport"));
    }
}
