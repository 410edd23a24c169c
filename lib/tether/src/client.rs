//! The client: interceptor registry and the execute pipeline.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{Instrument, Level, Span, debug, span, warn};

use crate::{
    ClientConfig, Error, HyperTransport, Interceptor, InterceptorChain, PreFlight, Request,
    Response, ResponseKind, Result, Transport, TransportRequest,
};

type Registry = Vec<Arc<dyn Interceptor>>;

/// What an execution delivered.
///
/// A successful call has a response and no error. A transport failure or a
/// bad URL has only an error. With
/// [`treat_non_success_status_as_error`](ClientConfig::treat_non_success_status_as_error)
/// a 4xx/5xx call carries both. An interceptor halt without an early
/// response carries neither.
#[derive(Debug, Clone)]
pub struct Outcome<K = Response> {
    /// The final response.
    pub response: Option<K>,
    /// The error delivered with or instead of the response.
    pub error: Option<Error>,
}

impl<K> Outcome<K> {
    fn failed(error: Error) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }

    /// Convert the response, keeping the error.
    pub fn map<T>(self, f: impl FnOnce(K) -> T) -> Outcome<T> {
        Outcome {
            response: self.response.map(f),
            error: self.error,
        }
    }

    /// `true` when an error was delivered.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// The response, or the error if one was delivered.
    ///
    /// # Errors
    ///
    /// Returns the delivered error, even when a response came with it.
    pub fn into_result(self) -> Result<Option<K>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.response),
        }
    }
}

/// Handle on a call running in the background.
#[derive(Debug)]
pub struct CallHandle {
    task: JoinHandle<()>,
}

impl CallHandle {
    /// Cancel the call. The callback will not fire if it has not already.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// `true` once the call has completed or been cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the call. Returns `false` if it was cancelled.
    pub async fn join(self) -> bool {
        self.task.await.is_ok()
    }
}

/// HTTP client.
///
/// Every execution snapshots the interceptor list, runs the pre-flight chain,
/// encodes the request, hands it to the [`Transport`] and runs the
/// post-flight chain over the response.
///
/// # Example
///
/// ```no_run
/// use tether::{Client, Request};
///
/// # async fn example() {
/// let client = Client::new();
/// let request = Request::builder()
///     .url("https://api.example.com/search")
///     .param("q", "rust")
///     .build();
///
/// let outcome = client.execute(request).await;
/// if let Some(response) = outcome.response {
///     println!("{}", response.status());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    interceptors: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("interceptors", &self.registry().len())
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a client on [`HyperTransport`] with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.interceptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an interceptor.
    pub fn add_interceptor(&self, interceptor: impl Interceptor + 'static) {
        self.registry().push(Arc::new(interceptor));
    }

    /// Insert an interceptor at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `index` is past the end.
    pub fn insert_interceptor(
        &self,
        index: usize,
        interceptor: impl Interceptor + 'static,
    ) -> Result<()> {
        let mut registry = self.registry();
        if index > registry.len() {
            return Err(Error::invalid_request(format!(
                "interceptor index {index} out of range (len {})",
                registry.len()
            )));
        }
        registry.insert(index, Arc::new(interceptor));
        Ok(())
    }

    /// Remove the interceptor at `index`.
    pub fn remove_interceptor(&self, index: usize) -> Option<Arc<dyn Interceptor>> {
        let mut registry = self.registry();
        (index < registry.len()).then(|| registry.remove(index))
    }

    /// A snapshot of the registered interceptors, in order.
    #[must_use]
    pub fn interceptors(&self) -> InterceptorChain {
        self.registry().iter().cloned().collect()
    }

    /// Execute a request.
    pub async fn execute(&self, request: Request) -> Outcome<Response> {
        self.execute_as(request).await
    }

    /// Execute a request and convert the final response into `K`.
    ///
    /// Interceptors always see the base [`Response`]; the conversion runs
    /// after the post-flight chain.
    pub async fn execute_as<K: ResponseKind>(&self, request: Request) -> Outcome<K> {
        match self.dispatch(request) {
            Dispatch::Done(outcome) => outcome.map(K::from_base),
            Dispatch::Pending(call) => call.run().await.map(K::from_base),
        }
    }

    /// Execute a request and hand the outcome to `callback`.
    ///
    /// The pre-flight chain runs before this returns. When no transport call
    /// is needed (an interceptor halted, or the URL is invalid) the callback
    /// fires before this returns and `None` is returned. Otherwise the call
    /// runs on a spawned task and the returned handle can cancel it.
    ///
    /// The callback fires exactly once unless the call is cancelled first.
    /// Interceptors see the base [`Response`]; `K` is built after post-flight.
    ///
    /// # Panics
    ///
    /// Panics if a transport call is needed outside a tokio runtime.
    pub fn execute_with_callback<K, F>(&self, request: Request, callback: F) -> Option<CallHandle>
    where
        K: ResponseKind,
        F: FnOnce(Outcome<K>) + Send + 'static,
    {
        match self.dispatch(request) {
            Dispatch::Done(outcome) => {
                callback(outcome.map(K::from_base));
                None
            }
            Dispatch::Pending(call) => {
                let task = tokio::spawn(async move {
                    let outcome = call.run().await;
                    callback(outcome.map(K::from_base));
                });
                Some(CallHandle { task })
            }
        }
    }

    fn dispatch(&self, request: Request) -> Dispatch {
        let chain = self.interceptors();
        let request = match chain.pre_flight(request, self.config.should_halt_on_protocol_skip) {
            PreFlight::Halted { response } => {
                debug!(
                    early_response = response.is_some(),
                    "interceptor halted, skipping transport"
                );
                return Dispatch::Done(Outcome {
                    response,
                    error: None,
                });
            }
            PreFlight::Completed { request, skipped } => {
                if skipped {
                    debug!("interceptor halted, skipping remaining interceptors");
                }
                request
            }
        };

        let effective = request.config().unwrap_or(&self.config);
        let full_url = request.full_url_with(&effective.query_encoder());
        let url = match parse_url(&full_url) {
            Ok(url) => url,
            Err(error) => {
                warn!(url = %full_url, %error, "cannot dispatch request");
                return Dispatch::Done(Outcome::failed(error));
            }
        };

        let transport = match request.config() {
            Some(config) => self.transport.session(config),
            None => Arc::clone(&self.transport),
        };

        let method = request.method();
        let span = span!(Level::INFO, "http_request", %method, %url);
        let wire = TransportRequest {
            method,
            url,
            headers: request.wire_headers(),
            body: request.body().map(|body| body.payload().clone()),
            timeout: effective.timeout,
        };

        Dispatch::Pending(PendingCall {
            transport,
            wire,
            request,
            chain,
            treat_status_as_error: self.config.treat_non_success_status_as_error,
            span,
        })
    }
}

fn parse_url(full_url: &str) -> Result<url::Url> {
    let url = url::Url::parse(full_url).map_err(|e| Error::bad_url(full_url, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::bad_url(
            full_url,
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}

enum Dispatch {
    Done(Outcome<Response>),
    Pending(PendingCall),
}

struct PendingCall {
    transport: Arc<dyn Transport>,
    wire: TransportRequest,
    request: Request,
    chain: InterceptorChain,
    treat_status_as_error: bool,
    span: Span,
}

impl PendingCall {
    async fn run(self) -> Outcome<Response> {
        let Self {
            transport,
            wire,
            request,
            chain,
            treat_status_as_error,
            span,
        } = self;

        async move {
            let raw = match transport.send(wire).await {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(%error, "transport failed");
                    return Outcome::failed(error);
                }
            };

            debug!(status = raw.status, body_len = raw.body.len(), "response received");
            let body = (!raw.body.is_empty()).then_some(raw.body);
            let mut response = Response::new(request, raw.status, raw.headers, body);

            let mut error = None;
            if treat_status_as_error && (400..=599).contains(&raw.status) {
                let status_error = Error::status_error(raw.status);
                response = response.error(status_error.clone());
                error = Some(status_error);
            }

            Outcome {
                response: Some(chain.post_flight(response)),
                error,
            }
        }
        .instrument(span)
        .await
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    config: Option<ClientConfig>,
    interceptors: Registry,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Use `transport` instead of [`HyperTransport`].
    #[must_use]
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use an already shared transport.
    #[must_use]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the client configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Append an interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> Client {
        let config = self.config.unwrap_or_default();
        Client {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::for_config(&config))),
            config,
            interceptors: Arc::new(Mutex::new(self.interceptors)),
        }
    }
}
