//! Registry assembly from raw configuration.
//!
//! An entry that fails validation is logged and skipped; the rest still
//! load. Activities are validated against the devices that survived.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use domain::{Activity, ConfigError};
use infrastructure::TransportFactory;
use infrastructure::config::{ActivityConfig, DeviceConfig};

use crate::device::ControlledDevice;
use crate::registry::Registry;

/// Build the registry from loaded device and activity definitions
pub async fn build_registry(
    device_configs: &[DeviceConfig],
    activity_configs: &[ActivityConfig],
) -> Registry {
    let mut devices = BTreeMap::new();
    for config in device_configs {
        match build_device(config).await {
            Ok(device) => {
                info!(device = %device.name(), kind = device.kind().as_str(), "Loaded device");
                devices.insert(device.name().to_string(), device);
            }
            Err(e) => {
                error!(device = %config.name, error = %e, "Unable to load device config, skipping");
            }
        }
    }

    let mut activities = BTreeMap::new();
    for config in activity_configs {
        match build_activity(config, &devices) {
            Ok(activity) => {
                info!(activity = %activity.name, "Loaded activity");
                activities.insert(activity.name.clone(), activity);
            }
            Err(e) => {
                error!(activity = %config.name, error = %e, "Unable to load activity config, skipping");
            }
        }
    }

    Registry::new(devices, activities)
}

async fn build_device(config: &DeviceConfig) -> Result<Arc<ControlledDevice>, ConfigError> {
    let device = config.to_device()?;
    let transport = TransportFactory::create(&config.transport)?;
    let device = ControlledDevice::new(device, transport);

    // Eager open; a failure here is retried on the first operation.
    if let Err(e) = device.connect().await {
        warn!(device = %device.name(), error = %e, "Initial connection failed");
    }

    Ok(Arc::new(device))
}

fn build_activity(
    config: &ActivityConfig,
    devices: &BTreeMap<String, Arc<ControlledDevice>>,
) -> Result<Activity, ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::MissingField("name".to_string()));
    }

    for name in &config.on_devices {
        if !devices.contains_key(name) {
            return Err(ConfigError::UnknownDevice(name.clone()));
        }
    }

    let inputs = config.parsed_inputs()?;
    for (device_name, button) in &inputs {
        let Some(device) = devices.get(device_name) else {
            return Err(ConfigError::UnknownDevice(device_name.clone()));
        };
        if !device.has_button(button) {
            return Err(ConfigError::UnknownButton(
                device_name.clone(),
                button.clone(),
            ));
        }
    }

    let description = if config.description.is_empty() {
        config.name.clone()
    } else {
        config.description.clone()
    };

    Ok(Activity {
        name: config.name.clone(),
        description,
        on_devices: config.on_devices.clone(),
        inputs,
    })
}
