use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::{sync::Arc, time::Instant};
use tracing::{debug, error, info, instrument, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;

/// Middleware for automatic request tracing and metrics collection
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // Group by route pattern so every mess type shares one endpoint label
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span_name = format!("{} {}", method, endpoint);

    let span = tracing::info_span!(
        target: "mess_menu::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        http.url = %uri,
        http.user_agent = %user_agent,
        http.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async {
        let _in_flight = InFlightGuard::new(metrics.clone(), &method, &endpoint);

        let trace_id = tracing::Span::current()
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();

        info!(trace_id = %trace_id, method = %method, path = %uri, "Processing request");

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        let current_span = tracing::Span::current();
        current_span.record("http.status_code", status_code);
        current_span.record("http.response_time_ms", duration_ms as u64);

        let span_context = current_span.context();
        let otel_span = span_context.span();
        if status_code >= 500 {
            otel_span.set_status(opentelemetry::trace::Status::error("HTTP server error"));
        } else {
            otel_span.set_status(opentelemetry::trace::Status::Ok);
        }

        metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());

        if status_code >= 500 {
            error!(
                trace_id = %trace_id,
                method = %method,
                path = %uri,
                status_code = status_code,
                duration_ms = duration_ms as u64,
                user_agent = %user_agent,
                "Request completed with error"
            );
        } else {
            info!(
                trace_id = %trace_id,
                method = %method,
                path = %uri,
                status_code = status_code,
                duration_ms = duration_ms as u64,
                user_agent = %user_agent,
                "Request completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Holds one `http_requests_in_flight` slot; released on drop, so a request
/// cancelled mid-flight still gives its slot back.
struct InFlightGuard {
    metrics: Arc<Metrics>,
    method: String,
    endpoint: String,
}

impl InFlightGuard {
    fn new(metrics: Arc<Metrics>, method: &str, endpoint: &str) -> Self {
        metrics.increment_in_flight(method, endpoint);
        Self {
            metrics,
            method: method.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.decrement_in_flight(&self.method, &self.endpoint);
    }
}

/// Wraps document store calls to time them and count successes and failures
pub struct StoreTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl StoreTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(
        operation = %operation,
        table = %table,
    ))]
    pub async fn trace_operation<F, T, E>(
        &self,
        operation: &str,
        table: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();

        match future.await {
            Ok(result) => {
                let duration = start_time.elapsed();
                self.metrics
                    .record_database_operation(operation, table, true, duration.as_secs_f64());

                info!(
                    duration_ms = duration.as_millis() as u64,
                    "Store operation completed successfully"
                );

                Ok(result)
            }
            Err(error) => {
                let duration = start_time.elapsed();
                self.metrics
                    .record_database_operation(operation, table, false, duration.as_secs_f64());

                debug!(
                    error = %error,
                    duration_ms = duration.as_millis() as u64,
                    "Store operation failed"
                );

                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "test response"
    }

    async fn error_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn slow_handler() -> &'static str {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        "too late"
    }

    fn app_with(metrics: Arc<Metrics>) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .route("/error", get(error_handler))
            .route("/slow", get(slow_handler))
            .layer(middleware::from_fn(move |req, next| {
                observability_middleware(metrics.clone(), req, next)
            }))
    }

    #[tokio::test]
    async fn test_observability_middleware_success() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = app_with(metrics.clone());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header("user-agent", "test-client/1.0")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let counter = metrics
            .http_requests_total
            .with_label_values(&["GET", "/test", "200"]);
        assert_eq!(counter.get(), 1.0);

        let in_flight = metrics
            .http_requests_in_flight
            .with_label_values(&["GET", "/test"]);
        assert_eq!(in_flight.get(), 0.0);
    }

    #[tokio::test]
    async fn test_observability_middleware_error() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = app_with(metrics.clone());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/error")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let counter = metrics
            .http_requests_total
            .with_label_values(&["GET", "/error", "500"]);
        assert_eq!(counter.get(), 1.0);
    }

    #[tokio::test]
    async fn test_cancelled_request_releases_in_flight_slot() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = app_with(metrics.clone());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/slow")
            .body(Body::empty())
            .unwrap();

        let in_flight = metrics
            .http_requests_in_flight
            .with_label_values(&["GET", "/slow"]);

        let mut pending = Box::pin(app.oneshot(request));
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(50), pending.as_mut()).await;
        assert!(timed_out.is_err());
        assert_eq!(in_flight.get(), 1.0);

        drop(pending);
        assert_eq!(in_flight.get(), 0.0);
    }

    #[tokio::test]
    async fn test_store_tracing_middleware() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let middleware = StoreTracingMiddleware::new(metrics.clone());

        let result = middleware
            .trace_operation("scan", "MensVeg", async { Ok::<_, String>(3usize) })
            .await;
        assert_eq!(result, Ok(3));

        let result = middleware
            .trace_operation("scan", "MensVeg", async { Err::<usize, _>("boom".to_string()) })
            .await;
        assert!(result.is_err());

        let ok = metrics
            .database_operations_total
            .with_label_values(&["scan", "MensVeg", "success"]);
        let failed = metrics
            .database_operations_total
            .with_label_values(&["scan", "MensVeg", "error"]);
        assert_eq!(ok.get(), 1.0);
        assert_eq!(failed.get(), 1.0);
    }
}
