use clap::Parser;

/// Process configuration.
///
/// Every setting can come from a flag, an environment variable, or a literal
/// default, in that order of precedence. Built once in `main` and never
/// mutated afterwards.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "alert-bridge",
    version,
    about = "Forwards HTTP alerts to a controller service over gRPC"
)]
pub struct BridgeConfig {
    /// The HTTP server address
    #[arg(long = "http_address", env = "HTTP_ADDRESS", default_value = "localhost:8888")]
    pub http_address: String,

    /// The gRPC server address
    #[arg(long = "grpc_address", env = "GRPC_ADDRESS", default_value = "localhost:50051")]
    pub grpc_address: String,

    /// The target JID to send alerts to
    #[arg(long = "target_jid", env = "TARGET_JID", default_value = "")]
    pub target_jid: String,

    /// The device JID used to send alerts
    #[arg(long = "device_jid", env = "DEVICE_JID", default_value = "")]
    pub device_jid: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long = "log_level", env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// OTLP collector endpoint; span export is disabled when unset
    #[arg(long = "otlp_endpoint", env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl BridgeConfig {
    /// Load `.env` if present, then parse the process arguments.
    ///
    /// Exits with a usage message on invalid flags.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}
