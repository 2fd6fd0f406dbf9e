use std::sync::Arc;

use tracing::{info, warn};

use crate::registry::Registry;

/// Drives the registry's devices into an activity's target state.
///
/// Button failures during activity execution are logged and ignored:
/// partial activation is preferable to refusing the whole activity.
pub struct Orchestrator {
    registry: Arc<Registry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Start a named activity. Returns 1 for an unknown name, otherwise 0.
    ///
    /// Every device gets exactly one power press ("on" for members of the
    /// activity's power-on set, "off" for everyone else), then the input
    /// presses run in declaration order, then the activity becomes current.
    pub async fn start(&self, activity: &str) -> i32 {
        let Some(activity) = self.registry.activity(activity).cloned() else {
            warn!(activity, "Received request for non-existent activity");
            return 1;
        };

        info!(activity = %activity.name, "Starting activity");

        for device in self.registry.devices() {
            let button = if activity.powers_on(device.name()) {
                "on"
            } else {
                "off"
            };
            if device.press_button(button).await != 0 {
                warn!(device = %device.name(), button, "Power press failed, continuing");
            }
        }

        for (device_name, button) in &activity.inputs {
            // Inputs are validated at load time; a miss here means the
            // registry and activity went out of sync.
            let Some(device) = self.registry.device(device_name) else {
                warn!(device = %device_name, button = %button, "Input press for unknown device, skipping");
                continue;
            };
            if device.press_button(button).await != 0 {
                warn!(device = %device_name, button = %button, "Input press failed, continuing");
            }
        }

        self.registry.set_current_activity(&activity.name);
        0
    }

    /// Press "off" on every device and clear the current activity.
    /// Always returns 0.
    pub async fn power_off(&self) -> i32 {
        info!("Powering off all devices");

        for device in self.registry.devices() {
            if device.press_button("off").await != 0 {
                warn!(device = %device.name(), "Power off press failed, continuing");
            }
        }

        self.registry.set_current_activity("");
        0
    }

    /// Name of the active activity; empty means none
    pub fn current(&self) -> String {
        self.registry.current_activity()
    }
}
