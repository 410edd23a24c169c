//! Transport implementations.
//!
//! - [`HyperTransport`] - the default, hyper-util with rustls
//! - [`ServiceTransport`] - wraps any tower service, so tower layers apply

mod hyper;
mod service;

pub use self::hyper::{HyperTransport, PoolSettings};
pub use self::service::{BoxedTransportService, ServiceTransport};
