//! gRPC utilities for the alert bridge.
//!
//! This module provides:
//! - Generated code for the controller service contract
//! - A controller client shared across request handlers
//! - Trace context propagation for outgoing calls

pub mod controller_client;
pub mod interceptors;

// Include the generated proto code
pub mod proto {
    pub mod controller {
        tonic::include_proto!("controller.v1");
    }
}

pub use controller_client::{
    ControllerClient, ControllerClientConfig, DeviceStatus, SendMessageRequest,
    SendMessageResponse, StatusResponse, describe_status,
};
pub use interceptors::{
    REQUEST_ID_KEY, TRACEPARENT_KEY, TRACESTATE_KEY, extract_request_id, inject_trace_context,
    inject_trace_context_with_request_id,
};
