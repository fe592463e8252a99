#![allow(dead_code)]

use alert_bridge::config::BridgeConfig;
use alert_bridge::startup::{Application, StartupError};
use clap::Parser;
use service_core::grpc::extract_request_id;
use service_core::grpc::proto::controller::controller_service_server::{
    ControllerService, ControllerServiceServer,
};
use service_core::grpc::proto::controller::{
    SendMessageRequest, SendMessageResponse, StatusRequest, StatusResponse,
};
use service_core::grpc::DeviceStatus;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

pub const DEVICE_JID: &str = "device@s.whatsapp.net";
pub const TARGET_JID: &str = "target@s.whatsapp.net";

#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub request: SendMessageRequest,
    pub request_id: Option<String>,
}

/// Stand-in for the controller, served over real gRPC.
#[derive(Clone)]
pub struct StubController {
    status: i32,
    fail_status: bool,
    fail_sends: bool,
    status_calls: Arc<Mutex<Vec<String>>>,
    sends: Arc<Mutex<Vec<RecordedSend>>>,
}

impl StubController {
    pub fn with_status(status: DeviceStatus) -> Self {
        Self {
            status: status as i32,
            fail_status: false,
            fail_sends: false,
            status_calls: Arc::default(),
            sends: Arc::default(),
        }
    }

    pub fn active() -> Self {
        Self::with_status(DeviceStatus::Active)
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<RecordedSend> {
        self.sends.lock().unwrap().clone()
    }
}

#[tonic::async_trait]
impl ControllerService for StubController {
    async fn status(
        &self,
        request: Request<StatusRequest>,
    ) -> Result<Response<StatusResponse>, Status> {
        self.status_calls
            .lock()
            .unwrap()
            .push(request.into_inner().jid);

        if self.fail_status {
            return Err(Status::internal("store unavailable"));
        }
        Ok(Response::new(StatusResponse {
            status: self.status,
        }))
    }

    async fn send_message(
        &self,
        request: Request<SendMessageRequest>,
    ) -> Result<Response<SendMessageResponse>, Status> {
        if self.fail_sends {
            return Err(Status::unavailable("device disconnected"));
        }

        let request_id = extract_request_id(&request);
        let mut sends = self.sends.lock().unwrap();
        sends.push(RecordedSend {
            request: request.into_inner(),
            request_id,
        });

        Ok(Response::new(SendMessageResponse {
            message_id: format!("stub-{}", sends.len()),
        }))
    }
}

/// Serve `stub` on an ephemeral port and return its `host:port`.
pub async fn spawn_controller(stub: StubController) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind controller listener");
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(ControllerServiceServer::new(stub))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .ok();
    });

    address
}

pub fn test_config(grpc_address: &str) -> BridgeConfig {
    BridgeConfig::try_parse_from([
        "alert-bridge",
        "--http_address",
        "127.0.0.1:0",
        "--grpc_address",
        grpc_address,
        "--device_jid",
        DEVICE_JID,
        "--target_jid",
        TARGET_JID,
    ])
    .expect("Failed to parse test configuration")
}

pub struct TestApp {
    pub address: String,
    pub http_port: u16,
    pub controller: StubController,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(controller: StubController) -> Self {
        Self::try_spawn(controller)
            .await
            .expect("Failed to build test application")
    }

    pub async fn try_spawn(controller: StubController) -> Result<Self, StartupError> {
        let grpc_address = spawn_controller(controller.clone()).await;
        let app = Application::build(test_config(&grpc_address)).await?;

        let http_port = app.http_port();
        let address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Ok(TestApp {
            address,
            http_port,
            controller,
            client,
        })
    }

    pub async fn post_alert(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/alert", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_raw(&self, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}/alert", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
