use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use domain::{ConfigError, ConnectionState, Transport, TransportError, TransportKind};

/// Serial line configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_parity")]
    pub parity: String, // "none", "even", "odd"
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    9600
}
fn default_data_bits() -> u8 {
    8
}
fn default_parity() -> String {
    "none".to_string()
}
fn default_stop_bits() -> u8 {
    1
}
fn default_timeout_ms() -> u64 {
    1000
}

impl SerialConfig {
    pub fn new(port: String) -> Self {
        Self {
            port,
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            parity: default_parity(),
            stop_bits: default_stop_bits(),
            timeout_ms: default_timeout_ms(),
        }
    }

    fn to_parity(&self) -> Result<tokio_serial::Parity, ConfigError> {
        match self.parity.to_lowercase().as_str() {
            "none" => Ok(tokio_serial::Parity::None),
            "even" => Ok(tokio_serial::Parity::Even),
            "odd" => Ok(tokio_serial::Parity::Odd),
            _ => Err(ConfigError::InvalidField(format!(
                "Illegal parity {:?}. Legal values are none, even, odd.",
                self.parity
            ))),
        }
    }

    fn to_stop_bits(&self) -> Result<tokio_serial::StopBits, ConfigError> {
        match self.stop_bits {
            1 => Ok(tokio_serial::StopBits::One),
            2 => Ok(tokio_serial::StopBits::Two),
            _ => Err(ConfigError::InvalidField(format!(
                "Illegal stop bits {}. Legal values are 1, 2.",
                self.stop_bits
            ))),
        }
    }

    fn to_data_bits(&self) -> Result<tokio_serial::DataBits, ConfigError> {
        match self.data_bits {
            5 => Ok(tokio_serial::DataBits::Five),
            6 => Ok(tokio_serial::DataBits::Six),
            7 => Ok(tokio_serial::DataBits::Seven),
            8 => Ok(tokio_serial::DataBits::Eight),
            _ => Err(ConfigError::InvalidField(format!(
                "Illegal data bits {}. Legal values are 5, 6, 7, 8.",
                self.data_bits
            ))),
        }
    }
}

/// Stream transport over a serial line.
///
/// The port is opened lazily: a disconnected transport attempts one
/// reconnect at the start of an operation and fails the call if that
/// attempt fails. Any write or read failure drops the port so the next
/// call starts from Disconnected again.
pub struct SerialTransport {
    config: SerialConfig,
    data_bits: tokio_serial::DataBits,
    parity: tokio_serial::Parity,
    stop_bits: tokio_serial::StopBits,
    port: Option<SerialStream>,
    state: ConnectionState,
}

impl SerialTransport {
    /// Validate the configuration and build a disconnected transport
    pub fn new(config: SerialConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            data_bits: config.to_data_bits()?,
            parity: config.to_parity()?,
            stop_bits: config.to_stop_bits()?,
            config,
            port: None,
            state: ConnectionState::Disconnected,
        })
    }

    fn open(&mut self) -> Result<(), TransportError> {
        tracing::debug!(
            port = %self.config.port,
            baud_rate = self.config.baud_rate,
            "Opening serial port"
        );

        let port = tokio_serial::new(&self.config.port, self.config.baud_rate)
            .data_bits(self.data_bits)
            .parity(self.parity)
            .stop_bits(self.stop_bits)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .open_native_async()
            .map_err(|e| {
                tracing::warn!(port = %self.config.port, error = %e, "Unable to open serial port");
                self.state = ConnectionState::Disconnected;
                TransportError::Connect(self.config.port.clone(), e.to_string())
            })?;

        self.port = Some(port);
        self.state = ConnectionState::Connected;

        tracing::debug!(port = %self.config.port, "Serial port opened");
        Ok(())
    }

    fn ensure_connected(&mut self) -> Result<(), TransportError> {
        if self.port.is_none() {
            self.open()?;
        }
        Ok(())
    }

    fn drop_connection(&mut self) {
        self.port = None;
        self.state = ConnectionState::Disconnected;
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        self.ensure_connected()
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.ensure_connected()?;

        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;
        let result = async {
            port.write_all(payload).await?;
            port.flush().await
        }
        .await;

        if let Err(e) = result {
            tracing::error!(
                port = %self.config.port,
                baud_rate = self.config.baud_rate,
                error = %e,
                "Unable to write to serial port"
            );
            self.drop_connection();
            return Err(TransportError::Write(e.to_string()));
        }

        Ok(())
    }

    async fn receive(&mut self, expected_len: usize) -> Result<Vec<u8>, TransportError> {
        self.ensure_connected()?;

        let timeout_ms = self.config.timeout_ms;
        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;

        let outcome = if expected_len == 0 {
            timeout(Duration::from_millis(timeout_ms), read_line(port)).await
        } else {
            timeout(
                Duration::from_millis(timeout_ms),
                read_exact_bytes(port, expected_len),
            )
            .await
        };

        match outcome {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => {
                tracing::error!(port = %self.config.port, error = %e, "Unable to read from serial port");
                self.drop_connection();
                Err(TransportError::Read(e.to_string()))
            }
            Err(_) => {
                tracing::error!(port = %self.config.port, timeout_ms, "Serial read timed out");
                self.drop_connection();
                Err(TransportError::Timeout(timeout_ms))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn connection_state(&self) -> ConnectionState {
        self.state
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }
}

/// Read until a line terminator, terminator included
async fn read_line(port: &mut SerialStream) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        let n = port.read(&mut byte).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before line terminator",
            ));
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            return Ok(line);
        }
    }
}

async fn read_exact_bytes(port: &mut SerialStream, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    port.read_exact(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::new("/dev/ttyS0".to_string());
        assert_eq!(config.port, "/dev/ttyS0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.parity, "none");
        assert_eq!(config.stop_bits, 1);
        assert_eq!(config.timeout_ms, 1000);
    }

    #[test]
    fn test_serial_config_parity_conversion() {
        let mut config = SerialConfig::new("/dev/ttyS0".to_string());

        config.parity = "even".to_string();
        assert!(matches!(
            config.to_parity().unwrap(),
            tokio_serial::Parity::Even
        ));

        config.parity = "Odd".to_string();
        assert!(matches!(
            config.to_parity().unwrap(),
            tokio_serial::Parity::Odd
        ));

        config.parity = "mark".to_string();
        assert!(config.to_parity().is_err());
    }

    #[test]
    fn test_serial_config_rejects_illegal_data_bits() {
        let mut config = SerialConfig::new("/dev/ttyS0".to_string());
        config.data_bits = 9;
        assert!(SerialTransport::new(config).is_err());
    }

    #[test]
    fn test_serial_config_rejects_illegal_stop_bits() {
        let mut config = SerialConfig::new("/dev/ttyS0".to_string());
        config.stop_bits = 3;
        assert!(config.to_stop_bits().is_err());
    }

    #[test]
    fn test_serial_initial_state() {
        let config = SerialConfig::new("/dev/ttyS0".to_string());
        let transport = SerialTransport::new(config).unwrap();

        assert_eq!(transport.connection_state(), ConnectionState::Disconnected);
        assert!(!transport.is_connected());
        assert_eq!(transport.kind(), TransportKind::Stream);
    }

    #[test]
    fn test_serial_config_from_json_value() {
        let config: SerialConfig =
            serde_json::from_value(serde_json::json!({"port": "/dev/ttyUSB0", "baud_rate": 115200}))
                .unwrap();

        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.data_bits, 8);
    }
}
