pub mod controller;

pub use controller::{ControllerApi, MockController, OutboundMessage};
