//! Controller service gRPC client.
//!
//! The controller owns the messaging devices. The bridge asks it for a
//! device's status once at startup and then relays every alert through
//! `SendMessage`.

use std::time::Duration;
use tonic::Request;
use tonic::transport::{Channel, Endpoint};

use super::interceptors::{inject_trace_context, inject_trace_context_with_request_id};
use super::proto::controller::controller_service_client::ControllerServiceClient;
use super::proto::controller::StatusRequest;

/// Configuration for the controller client.
#[derive(Clone, Debug)]
pub struct ControllerClientConfig {
    /// The gRPC endpoint of the controller (e.g., "http://localhost:50051").
    pub endpoint: String,
    /// Connection timeout. Only bounds channel establishment; calls made on
    /// the channel carry no deadline.
    pub connect_timeout: Duration,
}

impl Default for ControllerClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:50051".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ControllerClientConfig {
    /// Build a config from a bare `host:port` address.
    ///
    /// Addresses without a scheme are dialed over plaintext HTTP/2.
    pub fn for_address(address: &str) -> Self {
        Self {
            endpoint: endpoint_uri(address),
            ..Default::default()
        }
    }
}

fn endpoint_uri(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// Controller client for calling the controller service via gRPC.
///
/// Cloning is cheap; all clones multiplex over the same channel.
#[derive(Clone)]
pub struct ControllerClient {
    client: ControllerServiceClient<Channel>,
}

impl ControllerClient {
    /// Create a new controller client with the given configuration.
    pub async fn new(config: ControllerClientConfig) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(config.endpoint)?
            .connect_timeout(config.connect_timeout)
            .connect()
            .await?;

        Ok(Self {
            client: ControllerServiceClient::new(channel),
        })
    }

    /// Query the status of a device.
    pub async fn status(&self, jid: String) -> Result<StatusResponse, tonic::Status> {
        let mut request = Request::new(StatusRequest { jid });
        inject_trace_context(&mut request);

        let response = self.client.clone().status(request).await?;
        Ok(response.into_inner())
    }

    /// Send a message from `jid` to `phone`.
    pub async fn send_message(
        &self,
        jid: String,
        phone: String,
        body: String,
        request_id: Option<&str>,
    ) -> Result<SendMessageResponse, tonic::Status> {
        let mut request = Request::new(SendMessageRequest { jid, phone, body });
        match request_id {
            Some(id) => inject_trace_context_with_request_id(&mut request, id),
            None => inject_trace_context(&mut request),
        }

        let response = self.client.clone().send_message(request).await?;
        Ok(response.into_inner())
    }
}

/// Human readable name for a raw status value, including values this build
/// does not know about.
pub fn describe_status(raw: i32) -> String {
    match DeviceStatus::try_from(raw) {
        Ok(status) => status.as_str_name().to_string(),
        Err(_) => format!("STATUS_UNKNOWN({})", raw),
    }
}

// Re-export controller proto types for convenience
pub use super::proto::controller::status_response::Status as DeviceStatus;
pub use super::proto::controller::{SendMessageRequest, SendMessageResponse, StatusResponse};
