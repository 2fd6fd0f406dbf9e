use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use domain::response;
use domain::{Device, Transport, TransportError, TransportKind};

/// Runtime handle binding a device definition to its transport.
///
/// The mutex serializes transport operations per device so concurrent calls
/// never interleave bytes on one physical connection; operations on distinct
/// devices proceed independently.
pub struct ControlledDevice {
    device: Device,
    kind: TransportKind,
    transport: Mutex<Box<dyn Transport>>,
}

impl ControlledDevice {
    pub fn new(device: Device, transport: Box<dyn Transport>) -> Self {
        let kind = transport.kind();
        Self {
            device,
            kind,
            transport: Mutex::new(transport),
        }
    }

    pub fn name(&self) -> &str {
        &self.device.name
    }

    pub fn description(&self) -> &str {
        &self.device.description
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn has_button(&self, button: &str) -> bool {
        self.device.buttons.contains_key(button)
    }

    /// Best-effort initial open; the first operation retries on failure
    pub async fn connect(&self) -> Result<(), TransportError> {
        self.transport.lock().await.connect().await
    }

    /// Sorted button names
    pub fn list_buttons(&self) -> Vec<String> {
        self.device.buttons.keys().cloned().collect()
    }

    /// Sorted status command names
    pub fn list_status_cmds(&self) -> Vec<String> {
        self.device.status_cmds.keys().cloned().collect()
    }

    /// Press a named button. Returns 0 on success, 1 on failure.
    ///
    /// A request transport error still reports success: the request may have
    /// reached the device even though the response was lost.
    pub async fn press_button(&self, button: &str) -> i32 {
        info!(device = %self.device.name, button, "Received button press");

        let Some(payload) = self.device.buttons.get(button) else {
            warn!(device = %self.device.name, button, "Received press for non-existent button");
            return 1;
        };

        let mut transport = self.transport.lock().await;
        debug!(device = %self.device.name, button, payload = %hex(payload), "Sending button payload");

        if let Err(e) = transport.send(payload).await {
            return match self.kind {
                TransportKind::Stream => {
                    error!(device = %self.device.name, button, error = %e, "Unable to deliver button press");
                    1
                }
                TransportKind::Request => {
                    error!(device = %self.device.name, button, error = %e, "Request error after button press");
                    0
                }
            };
        }

        0
    }

    /// Run a named status command and normalize its response.
    ///
    /// Unknown commands and transport failures yield the empty string.
    pub async fn get_status(&self, command: &str) -> String {
        info!(device = %self.device.name, command, "Received status request");

        let Some(cmd) = self.device.status_cmds.get(command) else {
            warn!(device = %self.device.name, command, "Received request for non-existent status command");
            return String::new();
        };

        let mut transport = self.transport.lock().await;
        debug!(device = %self.device.name, command, payload = %hex(&cmd.payload), "Sending status command");

        if let Err(e) = transport.send(&cmd.payload).await {
            error!(device = %self.device.name, command, error = %e, "Unable to send status command");
            return String::new();
        }

        let response = match transport.receive(cmd.response_len).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(device = %self.device.name, command, error = %e, "Unable to read status response");
                return String::new();
            }
        };
        drop(transport);

        debug!(device = %self.device.name, command, response = %hex(&response), "Received response");

        let value = response::resolve(&response, cmd);
        debug!(device = %self.device.name, command, value = %value, "Returning status value");
        value
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
