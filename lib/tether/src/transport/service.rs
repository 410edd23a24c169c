//! Any tower service as a transport.

use std::sync::{Arc, Mutex};

use tower::ServiceExt;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::{
    ClientConfig, Error, Transport, TransportFuture, TransportRequest, TransportResponse,
};

/// Type-erased transport service.
pub type BoxedTransportService = BoxCloneService<TransportRequest, TransportResponse, Error>;

/// Adapts a cloneable [`tower::Service`] into a [`Transport`].
///
/// This is how tower middleware wraps a transport:
///
/// ```no_run
/// use tether::{HyperTransport, ServiceTransport};
/// use tower::ServiceBuilder;
///
/// let transport = ServiceTransport::new(
///     ServiceBuilder::new()
///         .concurrency_limit(8)
///         .service(HyperTransport::new()),
/// );
/// ```
///
/// Each call clones the service out of a lock and drives the clone, so the
/// lock is never held across an await. [`Transport::session`] hands out an
/// independent clone. Cookie handling is left to the wrapped service.
#[derive(Clone)]
pub struct ServiceTransport {
    inner: Arc<Mutex<BoxedTransportService>>,
}

impl std::fmt::Debug for ServiceTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceTransport").finish_non_exhaustive()
    }
}

impl ServiceTransport {
    /// Wrap `service`.
    pub fn new<S>(service: S) -> Self
    where
        S: Service<TransportRequest, Response = TransportResponse, Error = Error>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        Self::from_boxed(BoxCloneService::new(service))
    }

    fn from_boxed(service: BoxedTransportService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn service(&self) -> BoxedTransportService {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Transport for ServiceTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture {
        let service = self.service();
        Box::pin(async move { service.oneshot(request).await })
    }

    fn session(&self, _config: &ClientConfig) -> Arc<dyn Transport> {
        Arc::new(Self::from_boxed(self.service()))
    }
}
