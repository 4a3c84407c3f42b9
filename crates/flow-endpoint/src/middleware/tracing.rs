//! Per-request span with a correlation id.
//!
//! Every request runs inside a `flow_request` span carrying the correlation
//! id, method, path and final status. The id is echoed back in
//! `x-request-id`.

use crate::domain::{CorrelationId, REQUEST_ID_HEADER};
use axum::http::{HeaderValue, Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{info_span, Instrument, Span};

/// Layer creating a span per request
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestTracingLayer;

impl RequestTracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestTracingLayer {
    type Service = RequestTracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTracingService { inner }
    }
}

/// Service produced by [`RequestTracingLayer`]
#[derive(Clone, Debug)]
pub struct RequestTracingService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestTracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Take the instance that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let correlation_id = CorrelationId::from_header(
            req.headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        let span = info_span!(
            "flow_request",
            correlation_id = %correlation_id,
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status_code = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let result = inner.call(req).await;

                match result {
                    Ok(mut response) => {
                        let status = response.status();
                        let span = Span::current();
                        span.record("http.status_code", status.as_u16());
                        span.record(
                            "otel.status_code",
                            if status.is_success() { "OK" } else { "ERROR" },
                        );
                        if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                            response.headers_mut().insert(REQUEST_ID_HEADER, value);
                        }
                        tracing::debug!(status = status.as_u16(), "Request completed");
                        Ok(response)
                    }
                    Err(e) => {
                        Span::current().record("otel.status_code", "ERROR");
                        Err(e)
                    }
                }
            }
            .instrument(span),
        )
    }
}
