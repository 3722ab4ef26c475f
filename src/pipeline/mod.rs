//! Request interception pipeline
//!
//! A [`Chain`] is an immutable ordered list of [`Interceptor`]s. Binding it to a
//! terminal [`Endpoint`] with [`Chain::then`] yields a [`Pipeline`], a cloneable
//! tower service that axum can mount with `route_service`.
//!
//! Dispatch is strictly left to right: each interceptor either returns a
//! response of its own (the remaining interceptors and the endpoint never run)
//! or hands the request on with [`Next::run`].
//!
//! ```ignore
//! let base = Chain::new().add(ContentType::json());
//! let authed = base.add(Authenticate::new(jwt.access_key().clone()));
//!
//! let get_users = authed.add(Cors::allow(Method::GET)).then(handler(list_users, state.clone()));
//! let put_user = authed.add(Cors::allow(Method::PUT)).then(handler(update_user, state));
//! ```

pub mod interceptors;

pub use interceptors::{ContentType, Cors};

use async_trait::async_trait;
use axum::{
    extract::Request,
    handler::Handler,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::{
    convert::Infallible,
    marker::PhantomData,
    sync::Arc,
    task::{Context, Poll},
};

/// A unit of request processing that may reject or delegate
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, req: Request, next: Next<'_>) -> Response;
}

/// Terminal handler at the end of a chain
#[async_trait]
pub trait Endpoint: Send + Sync + 'static {
    async fn call(&self, req: Request) -> Response;
}

/// The rest of the chain, as seen from inside an interceptor
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    endpoint: &'a dyn Endpoint,
}

impl Next<'_> {
    /// Hand the request to the next interceptor, or to the endpoint if none remain
    pub async fn run(self, req: Request) -> Response {
        match self.rest.split_first() {
            Some((head, tail)) => {
                head.intercept(
                    req,
                    Next {
                        rest: tail,
                        endpoint: self.endpoint,
                    },
                )
                .await
            }
            None => self.endpoint.call(req).await,
        }
    }
}

/// Ordered, immutable sequence of interceptors
#[derive(Clone)]
pub struct Chain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::<Arc<dyn Interceptor>>::new().into(),
        }
    }

    /// Return a new chain with `interceptor` appended; `self` is left untouched
    pub fn add<I: Interceptor>(&self, interceptor: I) -> Self {
        let interceptors: Vec<Arc<dyn Interceptor>> = self
            .interceptors
            .iter()
            .cloned()
            .chain(std::iter::once(Arc::new(interceptor) as Arc<dyn Interceptor>))
            .collect();

        Self {
            interceptors: interceptors.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Bind the chain to its terminal endpoint
    pub fn then<E: Endpoint>(&self, endpoint: E) -> Pipeline {
        Pipeline {
            interceptors: self.interceptors.clone(),
            endpoint: Arc::new(endpoint),
        }
    }
}

/// A chain bound to its endpoint
#[derive(Clone)]
pub struct Pipeline {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    endpoint: Arc<dyn Endpoint>,
}

impl Pipeline {
    pub async fn dispatch(&self, req: Request) -> Response {
        Next {
            rest: &self.interceptors,
            endpoint: self.endpoint.as_ref(),
        }
        .run(req)
        .await
    }
}

impl tower::Service<Request> for Pipeline {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move { Ok(pipeline.dispatch(req).await) })
    }
}

/// Endpoint backed by an axum handler and its state
pub struct HandlerEndpoint<H, T, S> {
    handler: H,
    state: S,
    _marker: PhantomData<fn() -> T>,
}

/// Use an axum handler (with extractors) as the end of a chain
pub fn handler<H, T, S>(handler: H, state: S) -> HandlerEndpoint<H, T, S>
where
    H: Handler<T, S> + Sync,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    HandlerEndpoint {
        handler,
        state,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<H, T, S> Endpoint for HandlerEndpoint<H, T, S>
where
    H: Handler<T, S> + Sync,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    async fn call(&self, req: Request) -> Response {
        self.handler
            .clone()
            .call(req, self.state.clone())
            .await
            .into_response()
    }
}
