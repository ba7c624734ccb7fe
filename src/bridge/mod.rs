pub mod controller;
pub mod driver;
mod handlers;
pub mod inputs;
pub mod state;

pub use controller::{BridgeSnapshot, TelemetryBridge};
pub use driver::BridgeDriver;
pub use inputs::{BridgeInputs, PlaybackContext};
pub use state::{plan, BridgeState, BridgeStatus, SetupAction, TeardownAction, Transition};
