//! Metadata propagation for outgoing controller calls.
//!
//! W3C trace context is copied from the current span when an OpenTelemetry
//! exporter is installed; the HTTP request id travels as `x-request-id`.

use opentelemetry::trace::TraceContextExt;
use tonic::Request;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// gRPC metadata key for W3C traceparent header.
pub const TRACEPARENT_KEY: &str = "traceparent";

/// gRPC metadata key for W3C tracestate header.
pub const TRACESTATE_KEY: &str = "tracestate";

/// gRPC metadata key for request ID.
pub const REQUEST_ID_KEY: &str = "x-request-id";

/// Inject current trace context into outgoing gRPC request metadata.
///
/// No-op when the current span has no valid OpenTelemetry context, which is
/// the case whenever OTLP export is disabled.
pub fn inject_trace_context<T>(request: &mut Request<T>) {
    let context = Span::current().context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if !span_context.is_valid() {
        return;
    }

    // version-trace_id-span_id-trace_flags
    let traceparent = format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    );
    if let Ok(value) = traceparent.parse() {
        request.metadata_mut().insert(TRACEPARENT_KEY, value);
    }

    let tracestate = span_context.trace_state().header();
    if !tracestate.is_empty() {
        if let Ok(value) = tracestate.parse() {
            request.metadata_mut().insert(TRACESTATE_KEY, value);
        }
    }
}

/// Inject trace context and request ID into outgoing gRPC request metadata.
pub fn inject_trace_context_with_request_id<T>(request: &mut Request<T>, request_id: &str) {
    inject_trace_context(request);

    if let Ok(value) = request_id.parse() {
        request.metadata_mut().insert(REQUEST_ID_KEY, value);
    }
}

/// Extract request ID from gRPC request metadata.
pub fn extract_request_id<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(REQUEST_ID_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_and_extract_request_id() {
        let mut request = Request::new(());
        inject_trace_context_with_request_id(&mut request, "alert-7f3a");

        assert_eq!(extract_request_id(&request), Some("alert-7f3a".to_string()));
    }

    #[test]
    fn test_no_traceparent_without_exporter() {
        let mut request = Request::new(());
        inject_trace_context(&mut request);

        assert!(request.metadata().get(TRACEPARENT_KEY).is_none());
        assert!(request.metadata().get(TRACESTATE_KEY).is_none());
    }

    #[test]
    fn test_invalid_request_id_is_skipped() {
        let mut request = Request::new(());
        inject_trace_context_with_request_id(&mut request, "bad\nvalue");

        assert!(extract_request_id(&request).is_none());
    }
}
