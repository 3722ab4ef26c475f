//! Standard interceptors: content-type stamping and CORS method assertion

use super::{Interceptor, Next};
use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
};

/// Stamps a fixed `content-type` on every response; never rejects
#[derive(Debug, Clone)]
pub struct ContentType {
    value: HeaderValue,
}

impl ContentType {
    pub fn json() -> Self {
        Self {
            value: HeaderValue::from_static("application/json"),
        }
    }
}

#[async_trait]
impl Interceptor for ContentType {
    async fn intercept(&self, req: Request, next: Next<'_>) -> Response {
        let mut response = next.run(req).await;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, self.value.clone());
        response
    }
}

/// Allows exactly one method for the chain and stamps
/// `Access-Control-Allow-Origin: *`; any other method is rejected with 405
#[derive(Debug, Clone)]
pub struct Cors {
    method: Method,
}

impl Cors {
    pub fn allow(method: Method) -> Self {
        Self { method }
    }
}

#[async_trait]
impl Interceptor for Cors {
    async fn intercept(&self, req: Request, next: Next<'_>) -> Response {
        if req.method() != self.method {
            tracing::debug!(
                expected = %self.method,
                got = %req.method(),
                "Method rejected by CORS assertion"
            );
            let mut response = AppError::MethodNotAllowed.into_response();
            response
                .headers_mut()
                .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            return response;
        }

        let mut response = next.run(req).await;
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        response
    }
}
