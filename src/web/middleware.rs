//! Custom middleware for HTTP request logging
//!
//! Every request is logged once the inner service answers, with its status
//! and how long the view took to build.

use axum::{body::Body, http::Request, response::Response};
use futures::future::BoxFuture;
use std::{
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};

/// Layer for HTTP request logging
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLoggingLayer;

impl<S> Layer<S> for RequestLoggingLayer {
    type Service = RequestLoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggingMiddleware { inner }
    }
}

/// Middleware service for HTTP request logging
#[derive(Clone)]
pub struct RequestLoggingMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestLoggingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let started = Instant::now();

            let result = inner.call(request).await;

            if let Ok(response) = &result {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    tracing::warn!("HTTP {} {} -> {} ({:.1}ms)", method, path, status.as_u16(), elapsed_ms);
                } else {
                    tracing::info!("HTTP {} {} -> {} ({:.1}ms)", method, path, status.as_u16(), elapsed_ms);
                }
            }

            result
        })
    }
}
