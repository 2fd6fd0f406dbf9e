/// A named target system state: the devices that must be powered on plus an
/// ordered input-selection sequence.
///
/// Cross-references (device names, input buttons) are validated when the
/// registry is assembled; an `Activity` value is assumed consistent with
/// the device set it was loaded against.
#[derive(Debug, Clone)]
pub struct Activity {
    pub name: String,
    pub description: String,
    /// Devices pressed "on" when the activity starts; all others get "off"
    pub on_devices: Vec<String>,
    /// (device, button) presses run in order after power state is settled
    pub inputs: Vec<(String, String)>,
}

impl Activity {
    pub fn powers_on(&self, device: &str) -> bool {
        self.on_devices.iter().any(|name| name == device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powers_on_membership() {
        let activity = Activity {
            name: "movie".to_string(),
            description: "Watch a movie".to_string(),
            on_devices: vec!["tv".to_string(), "amp".to_string()],
            inputs: vec![("amp".to_string(), "hdmi1".to_string())],
        };

        assert!(activity.powers_on("tv"));
        assert!(activity.powers_on("amp"));
        assert!(!activity.powers_on("projector"));
    }
}
