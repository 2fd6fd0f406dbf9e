use std::collections::BTreeMap;

use crate::status::StatusCommand;

/// Static definition of a controllable device: its identity plus the named
/// buttons and status commands it understands.
///
/// Button payloads are already transport-ready bytes (raw command bytes for
/// stream devices, full URLs for request devices). The runtime transport
/// binding lives in the application layer.
#[derive(Debug, Clone, Default)]
pub struct Device {
    pub name: String,
    pub description: String,
    pub buttons: BTreeMap<String, Vec<u8>>,
    pub status_cmds: BTreeMap<String, StatusCommand>,
}

impl Device {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            buttons: BTreeMap::new(),
            status_cmds: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_creation() {
        let mut device = Device::new("amp", "AV receiver");
        device.buttons.insert("on".to_string(), b"PWON\r".to_vec());

        assert_eq!(device.name, "amp");
        assert_eq!(device.description, "AV receiver");
        assert_eq!(device.buttons["on"], b"PWON\r");
        assert!(device.status_cmds.is_empty());
    }

    #[test]
    fn test_button_names_iterate_sorted() {
        let mut device = Device::new("amp", "AV receiver");
        device.buttons.insert("volume_up".to_string(), vec![1]);
        device.buttons.insert("off".to_string(), vec![2]);
        device.buttons.insert("on".to_string(), vec![3]);

        let names: Vec<_> = device.buttons.keys().cloned().collect();
        assert_eq!(names, ["off", "on", "volume_up"]);
    }
}
