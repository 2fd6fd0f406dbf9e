use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use domain::Activity;

use crate::device::ControlledDevice;

/// Process-wide mapping of names to devices and activities, plus the
/// currently active activity.
///
/// The maps are immutable after startup; only transport connection state
/// and the current activity mutate during operation.
pub struct Registry {
    devices: BTreeMap<String, Arc<ControlledDevice>>,
    activities: BTreeMap<String, Activity>,
    current_activity: RwLock<String>,
}

impl Registry {
    pub fn new(
        devices: BTreeMap<String, Arc<ControlledDevice>>,
        activities: BTreeMap<String, Activity>,
    ) -> Self {
        Self {
            devices,
            activities,
            current_activity: RwLock::new(String::new()),
        }
    }

    pub fn device(&self, name: &str) -> Option<&Arc<ControlledDevice>> {
        self.devices.get(name)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Arc<ControlledDevice>> {
        self.devices.values()
    }

    /// Sorted device names
    pub fn device_names(&self) -> Vec<String> {
        self.devices.keys().cloned().collect()
    }

    pub fn activity(&self, name: &str) -> Option<&Activity> {
        self.activities.get(name)
    }

    /// Sorted activity names
    pub fn activity_names(&self) -> Vec<String> {
        self.activities.keys().cloned().collect()
    }

    /// Name of the active activity; empty means none
    pub fn current_activity(&self) -> String {
        self.current_activity.read().unwrap().clone()
    }

    pub(crate) fn set_current_activity(&self, name: &str) {
        *self.current_activity.write().unwrap() = name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_registry() -> Registry {
        Registry::new(BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn test_no_activity_is_active_initially() {
        let registry = empty_registry();
        assert_eq!(registry.current_activity(), "");
    }

    #[test]
    fn test_current_activity_round_trip() {
        let registry = empty_registry();

        registry.set_current_activity("movie");
        assert_eq!(registry.current_activity(), "movie");

        registry.set_current_activity("");
        assert_eq!(registry.current_activity(), "");
    }

    #[test]
    fn test_unknown_lookups_return_none() {
        let registry = empty_registry();
        assert!(registry.device("tv").is_none());
        assert!(registry.activity("movie").is_none());
    }
}
