use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use metrics::counter;
use service_core::error::AppError;
use service_core::middleware::RequestId;

use crate::models::AlertRequest;
use crate::services::OutboundMessage;
use crate::startup::{AppState, MAX_BODY_BYTES};

/// Relay an alert to the configured target through the configured device.
///
/// The controller's reply is not inspected; a successful call echoes the
/// parsed request back to the caller.
#[tracing::instrument(skip_all, fields(request_id))]
pub async fn receive_alert(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AlertRequest>, AppError> {
    let request_id = request_id.map(|Extension(id)| id);
    if let Some(id) = &request_id {
        tracing::Span::current().record("request_id", id.as_str());
    }

    counter!("alerts_received_total").increment(1);

    let alert = parse_alert(&headers, body).map_err(|err| {
        tracing::warn!(error = %err, "Rejected alert payload");
        counter!("alerts_failed_total", "reason" => "invalid_request").increment(1);
        err
    })?;

    tracing::info!(
        heartbeat = %alert.heartbeat,
        monitor = %alert.monitor,
        msg = %alert.message,
        "Received alert"
    );

    let message = OutboundMessage {
        device_jid: state.config.device_jid.clone(),
        target_jid: state.config.target_jid.clone(),
        body: alert.message.clone(),
    };

    state
        .controller
        .send_message(&message, request_id.as_ref().map(RequestId::as_str))
        .await
        .map_err(|status| {
            tracing::error!(
                code = ?status.code(),
                message = %status.message(),
                "SendMessage failed"
            );
            counter!("alerts_failed_total", "reason" => "send_failed").increment(1);
            AppError::UpstreamError("Failed to send message", status)
        })?;

    counter!("alerts_forwarded_total").increment(1);

    Ok(Json(alert))
}

/// Decode an alert body.
///
/// An empty body binds nothing and yields the default alert regardless of
/// content type. A non-empty body must be declared as JSON.
fn parse_alert(
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<AlertRequest, AppError> {
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(MAX_BODY_BYTES),
        _ => AppError::BadRequest(anyhow::anyhow!(rejection.body_text())),
    })?;

    if body.is_empty() {
        return Ok(AlertRequest::default());
    }

    if !is_json_content_type(headers) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Expected request with `Content-Type: application/json`"
        )));
    }

    serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.into()))
}

/// `application/json`, optionally with parameters, or any `+json` suffix type.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
