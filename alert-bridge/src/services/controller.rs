use async_trait::async_trait;
use service_core::grpc::{ControllerClient, DeviceStatus, StatusResponse};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tonic::Status;

/// Message relayed to the controller for one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub device_jid: String,
    pub target_jid: String,
    pub body: String,
}

/// The controller operations the bridge depends on.
///
/// Implementations must tolerate concurrent calls from many request handlers.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    async fn status(&self, device_jid: &str) -> Result<StatusResponse, Status>;

    async fn send_message(
        &self,
        message: &OutboundMessage,
        request_id: Option<&str>,
    ) -> Result<(), Status>;
}

#[async_trait]
impl ControllerApi for ControllerClient {
    async fn status(&self, device_jid: &str) -> Result<StatusResponse, Status> {
        ControllerClient::status(self, device_jid.to_string()).await
    }

    async fn send_message(
        &self,
        message: &OutboundMessage,
        request_id: Option<&str>,
    ) -> Result<(), Status> {
        ControllerClient::send_message(
            self,
            message.device_jid.clone(),
            message.target_jid.clone(),
            message.body.clone(),
            request_id,
        )
        .await
        .map(|_| ())
    }
}

/// In-memory controller for tests and local runs without a controller.
pub struct MockController {
    status: Option<i32>,
    send_enabled: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MockController {
    /// Report `status` and accept (or reject) every send.
    pub fn new(status: DeviceStatus, send_enabled: bool) -> Self {
        Self::with_raw_status(status as i32, send_enabled)
    }

    /// Report a raw status value, which may be outside the known enum.
    pub fn with_raw_status(status: i32, send_enabled: bool) -> Self {
        Self {
            status: Some(status),
            send_enabled,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call as if the controller were down.
    pub fn unreachable() -> Self {
        Self {
            status: None,
            ..Self::with_raw_status(0, false)
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn status(&self, _device_jid: &str) -> Result<StatusResponse, Status> {
        match self.status {
            Some(status) => Ok(StatusResponse { status }),
            None => Err(Status::unavailable("mock controller is unreachable")),
        }
    }

    async fn send_message(
        &self,
        message: &OutboundMessage,
        _request_id: Option<&str>,
    ) -> Result<(), Status> {
        if self.status.is_none() {
            return Err(Status::unavailable("mock controller is unreachable"));
        }
        if !self.send_enabled {
            return Err(Status::internal("mock controller rejected the message"));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());

        tracing::info!(
            target_jid = %message.target_jid,
            body_length = message.body.len(),
            "[MOCK] Message would be sent"
        );

        Ok(())
    }
}
