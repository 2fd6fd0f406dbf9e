use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use application::{ControlledDevice, Orchestrator, Registry};
use domain::{Activity, ConnectionState, Device, Transport, TransportError, TransportKind};

// --- Fake transport that records presses into a shared log ---

type PressLog = Arc<Mutex<Vec<String>>>;

struct RecordingTransport {
    device: String,
    fail_sends: bool,
    log: PressLog,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Write("simulated write failure".to_string()));
        }
        let pressed = String::from_utf8_lossy(payload).into_owned();
        self.log.lock().await.push(format!("{}:{}", self.device, pressed));
        Ok(())
    }

    async fn receive(&mut self, _expected_len: usize) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::NotConnected)
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn connection_state(&self) -> ConnectionState {
        ConnectionState::Connected
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }
}

fn device_with_buttons(
    name: &str,
    buttons: &[&str],
    log: &PressLog,
    fail_sends: bool,
) -> Arc<ControlledDevice> {
    let mut device = Device::new(name, name);
    for button in buttons {
        // The payload doubles as the press label in the log.
        device
            .buttons
            .insert(button.to_string(), button.as_bytes().to_vec());
    }

    let transport = RecordingTransport {
        device: name.to_string(),
        fail_sends,
        log: log.clone(),
    };
    Arc::new(ControlledDevice::new(device, Box::new(transport)))
}

fn movie_registry(log: &PressLog) -> Arc<Registry> {
    let mut devices = BTreeMap::new();
    for name in ["amp", "proj", "tv"] {
        devices.insert(
            name.to_string(),
            device_with_buttons(name, &["on", "off", "hdmi1"], log, false),
        );
    }

    let movie = Activity {
        name: "movie".to_string(),
        description: "Watch a movie".to_string(),
        on_devices: vec!["tv".to_string(), "amp".to_string()],
        inputs: vec![("amp".to_string(), "hdmi1".to_string())],
    };

    let mut activities = BTreeMap::new();
    activities.insert(movie.name.clone(), movie);

    Arc::new(Registry::new(devices, activities))
}

#[tokio::test]
async fn test_activity_start_sets_power_then_inputs() {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));
    let registry = movie_registry(&log);
    let orchestrator = Orchestrator::new(registry);

    assert_eq!(orchestrator.start("movie").await, 0);
    assert_eq!(orchestrator.current(), "movie");

    let presses = log.lock().await.clone();
    assert_eq!(presses, ["amp:on", "proj:off", "tv:on", "amp:hdmi1"]);
}

#[tokio::test]
async fn test_unknown_activity_returns_failure() {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));
    let registry = movie_registry(&log);
    let orchestrator = Orchestrator::new(registry);

    assert_eq!(orchestrator.start("gaming").await, 1);
    assert_eq!(orchestrator.current(), "");
    assert!(log.lock().await.is_empty());
}

#[tokio::test]
async fn test_activity_becomes_current_despite_press_failures() {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));

    let mut devices = BTreeMap::new();
    // The amp drops every write, including the input selection press.
    devices.insert(
        "amp".to_string(),
        device_with_buttons("amp", &["on", "off", "hdmi1"], &log, true),
    );
    devices.insert(
        "tv".to_string(),
        device_with_buttons("tv", &["on", "off"], &log, false),
    );

    let movie = Activity {
        name: "movie".to_string(),
        description: "Watch a movie".to_string(),
        on_devices: vec!["tv".to_string(), "amp".to_string()],
        inputs: vec![("amp".to_string(), "hdmi1".to_string())],
    };
    let mut activities = BTreeMap::new();
    activities.insert(movie.name.clone(), movie);

    let orchestrator = Orchestrator::new(Arc::new(Registry::new(devices, activities)));

    assert_eq!(orchestrator.start("movie").await, 0);
    assert_eq!(orchestrator.current(), "movie");
    assert_eq!(log.lock().await.clone(), ["tv:on"]);
}

#[tokio::test]
async fn test_devices_without_power_buttons_do_not_block_activity() {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));

    let mut devices = BTreeMap::new();
    devices.insert(
        "tv".to_string(),
        device_with_buttons("tv", &["on", "off"], &log, false),
    );
    // No "on"/"off" buttons at all.
    devices.insert(
        "lamp".to_string(),
        device_with_buttons("lamp", &["toggle"], &log, false),
    );

    let movie = Activity {
        name: "movie".to_string(),
        description: "Watch a movie".to_string(),
        on_devices: vec!["tv".to_string()],
        inputs: vec![],
    };
    let mut activities = BTreeMap::new();
    activities.insert(movie.name.clone(), movie);

    let orchestrator = Orchestrator::new(Arc::new(Registry::new(devices, activities)));

    assert_eq!(orchestrator.start("movie").await, 0);
    assert_eq!(orchestrator.current(), "movie");
    assert_eq!(log.lock().await.clone(), ["tv:on"]);
}

#[tokio::test]
async fn test_power_off_presses_every_device_and_clears_current() {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));
    let registry = movie_registry(&log);
    let orchestrator = Orchestrator::new(registry);

    orchestrator.start("movie").await;
    log.lock().await.clear();

    assert_eq!(orchestrator.power_off().await, 0);
    assert_eq!(orchestrator.current(), "");

    let presses = log.lock().await.clone();
    assert_eq!(presses, ["amp:off", "proj:off", "tv:off"]);
}

#[tokio::test]
async fn test_power_off_succeeds_even_when_a_device_fails() {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));

    let mut devices = BTreeMap::new();
    devices.insert(
        "amp".to_string(),
        device_with_buttons("amp", &["on", "off"], &log, true),
    );
    devices.insert(
        "tv".to_string(),
        device_with_buttons("tv", &["on", "off"], &log, false),
    );

    let orchestrator = Orchestrator::new(Arc::new(Registry::new(devices, BTreeMap::new())));

    assert_eq!(orchestrator.power_off().await, 0);
    assert_eq!(orchestrator.current(), "");
    assert_eq!(log.lock().await.clone(), ["tv:off"]);
}
