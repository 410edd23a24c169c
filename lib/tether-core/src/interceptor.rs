//! Interceptors and the ordered chain that runs them.
//!
//! An [`Interceptor`] sees every request before dispatch and every response
//! after it. Both passes walk the list in registration order; neither is
//! reversed on the way back.
//!
//! # Example
//!
//! ```
//! use tether_core::{Interceptor, Request, RequestFlow};
//!
//! struct UserAgent;
//!
//! impl Interceptor for UserAgent {
//!     fn handle_request(&self, request: Request) -> RequestFlow {
//!         let request = request.to_builder().header("User-Agent", "tether").build();
//!         RequestFlow::proceed(request)
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::{Request, Response};

/// Result of the pre-flight step of one interceptor.
#[derive(Debug, Clone)]
pub struct RequestFlow {
    /// Continue with the next interceptor.
    pub proceed: bool,
    /// The request to carry forward, possibly rewritten.
    pub request: Request,
    /// Candidate early response. Later interceptors may replace it.
    pub response: Option<Response>,
}

impl RequestFlow {
    /// Continue with `request`.
    #[must_use]
    pub const fn proceed(request: Request) -> Self {
        Self {
            proceed: true,
            request,
            response: None,
        }
    }

    /// Continue with `request`, offering `response` as the candidate.
    #[must_use]
    pub const fn proceed_with_response(request: Request, response: Response) -> Self {
        Self {
            proceed: true,
            request,
            response: Some(response),
        }
    }

    /// Stop the chain. `response`, if any, becomes the candidate.
    #[must_use]
    pub const fn halt(request: Request, response: Option<Response>) -> Self {
        Self {
            proceed: false,
            request,
            response,
        }
    }
}

/// Result of the post-flight step of one interceptor.
#[derive(Debug, Clone)]
pub struct ResponseFlow {
    /// Continue with the next interceptor.
    pub proceed: bool,
    /// The response to carry forward, possibly replaced.
    pub response: Response,
}

impl ResponseFlow {
    /// Continue with `response`.
    #[must_use]
    pub const fn proceed(response: Response) -> Self {
        Self {
            proceed: true,
            response,
        }
    }

    /// Stop the chain; `response` is final.
    #[must_use]
    pub const fn halt(response: Response) -> Self {
        Self {
            proceed: false,
            response,
        }
    }
}

/// A pluggable step run before dispatch and after the response arrives.
///
/// Interceptors are shared between concurrent calls. Any state they keep
/// must be synchronized internally.
pub trait Interceptor: Send + Sync {
    /// Inspect or rewrite the outgoing request.
    fn handle_request(&self, request: Request) -> RequestFlow {
        RequestFlow::proceed(request)
    }

    /// Inspect or replace the incoming response.
    fn handle_response(&self, response: Response) -> ResponseFlow {
        ResponseFlow::proceed(response)
    }
}

/// Outcome of the pre-flight pass.
#[derive(Debug)]
pub enum PreFlight {
    /// An interceptor halted and halts skip the transport. The candidate
    /// response, if any, is final.
    Halted {
        /// Candidate response at the time of the halt.
        response: Option<Response>,
    },
    /// Dispatch `request`.
    Completed {
        /// The request as left by the last interceptor that ran.
        request: Request,
        /// `true` when an interceptor halted early and the rest were skipped.
        skipped: bool,
    },
}

/// An ordered snapshot of interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

impl InterceptorChain {
    /// Create a chain over `interceptors`, in order.
    #[must_use]
    pub const fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    /// Number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// `true` when the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run every interceptor's request step.
    ///
    /// The request is replaced at every step. When an interceptor halts and
    /// `halt_on_skip` is set the candidate response is returned; otherwise the
    /// remaining interceptors are skipped and the candidate is dropped.
    #[must_use]
    pub fn pre_flight(&self, mut request: Request, halt_on_skip: bool) -> PreFlight {
        let mut candidate = None;
        for interceptor in &self.interceptors {
            let flow = interceptor.handle_request(request);
            request = flow.request;
            if flow.response.is_some() {
                candidate = flow.response;
            }
            if !flow.proceed {
                if halt_on_skip {
                    return PreFlight::Halted {
                        response: candidate,
                    };
                }
                return PreFlight::Completed {
                    request,
                    skipped: true,
                };
            }
        }
        PreFlight::Completed {
            request,
            skipped: false,
        }
    }

    /// Run every interceptor's response step, stopping at the first halt.
    #[must_use]
    pub fn post_flight(&self, mut response: Response) -> Response {
        for interceptor in &self.interceptors {
            let flow = interceptor.handle_response(response);
            response = flow.response;
            if !flow.proceed {
                break;
            }
        }
        response
    }
}

impl FromIterator<Arc<dyn Interceptor>> for InterceptorChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Interceptor>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
