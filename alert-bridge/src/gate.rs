//! One-shot device check run before the HTTP listener binds.

use service_core::grpc::{DeviceStatus, describe_status};
use thiserror::Error;

use crate::services::ControllerApi;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Status call failed: {0}")]
    StatusCallFailed(#[source] tonic::Status),

    #[error("Device is not active: {0}")]
    DeviceInactive(String),
}

/// Ask the controller whether `device_jid` is active.
///
/// A failed call is reported separately from a non-active answer. Both are
/// fatal to the caller.
#[tracing::instrument(skip(controller))]
pub async fn check_device_active(
    controller: &dyn ControllerApi,
    device_jid: &str,
) -> Result<DeviceStatus, GateError> {
    let response = controller.status(device_jid).await.map_err(|status| {
        tracing::error!(code = ?status.code(), message = %status.message(), "Status call failed");
        GateError::StatusCallFailed(status)
    })?;

    let status_name = describe_status(response.status);
    tracing::info!(status = %status_name, "Device status");

    match DeviceStatus::try_from(response.status) {
        Ok(DeviceStatus::Active) => Ok(DeviceStatus::Active),
        _ => Err(GateError::DeviceInactive(status_name)),
    }
}
