use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{BridgeInputs, TelemetryBridge};

/// Runs a bridge off a `watch` channel of inputs.
///
/// Hosts that already observe their page state through Tokio publish every
/// new input set on the channel; the driver reconciles on each change and
/// unmounts the bridge when stopped or when the sender goes away.
pub struct BridgeDriver {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl BridgeDriver {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Must be called from within a Tokio runtime.
    pub fn start(
        &mut self,
        bridge: TelemetryBridge,
        inputs: watch::Receiver<BridgeInputs>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("bridge driver already running");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(drive(bridge, inputs, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("bridge driver task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for BridgeDriver {
    fn default() -> Self {
        Self::new()
    }
}

async fn drive(
    bridge: TelemetryBridge,
    mut inputs: watch::Receiver<BridgeInputs>,
    cancel_token: CancellationToken,
) {
    let initial = inputs.borrow_and_update().clone();
    bridge.reconcile(initial);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Bridge driver cancelled");
                break;
            }
            changed = inputs.changed() => {
                if changed.is_err() {
                    info!("Bridge inputs closed; unmounting");
                    break;
                }
                let next = inputs.borrow_and_update().clone();
                bridge.reconcile(next);
            }
        }
    }

    bridge.unmount();
}
