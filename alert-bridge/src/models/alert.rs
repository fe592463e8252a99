use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Inbound alert payload, typically posted by an uptime monitor webhook.
///
/// `heartbeat` and `monitor` are passed through untouched. Absent fields
/// echo back as `null`; a missing or `null` `msg` forwards an empty message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    #[serde(default)]
    pub heartbeat: Value,
    #[serde(default)]
    pub monitor: Value,
    #[serde(default, rename = "msg", deserialize_with = "null_as_empty")]
    pub message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
