mod http;
mod serial;

pub use http::{HttpConfig, HttpTransport};
pub use serial::{SerialConfig, SerialTransport};

use domain::{ConfigError, Transport};

use crate::config::TransportConfig;

/// Factory for creating device transports
pub struct TransportFactory;

impl TransportFactory {
    /// Create a transport from the per-device transport configuration.
    ///
    /// All parameter validation (data bits, parity, stop bits) happens
    /// here, at load time; a successfully built transport never fails on
    /// malformed parameters later.
    pub fn create(config: &TransportConfig) -> Result<Box<dyn Transport>, ConfigError> {
        match config {
            TransportConfig::Serial(serial) => {
                Ok(Box::new(SerialTransport::new(serial.clone())?) as Box<dyn Transport>)
            }
            TransportConfig::Http(http) => {
                Ok(Box::new(HttpTransport::new(http.clone())?) as Box<dyn Transport>)
            }
        }
    }
}
