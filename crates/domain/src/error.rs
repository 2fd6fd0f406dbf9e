use thiserror::Error;

/// Configuration errors.
///
/// Fatal only for the offending device or activity entry: the loader logs
/// the error, skips the entry, and the rest of the registry still loads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value: {0}")]
    InvalidField(String),

    #[error("Invalid byte range expression: {0}")]
    InvalidByteRange(String),

    #[error("Invalid bit filter expression: {0}")]
    InvalidBitFilter(String),

    #[error("Invalid response pattern: {0}")]
    InvalidPattern(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Unknown button on device {0}: {1}")]
    UnknownButton(String, String),

    #[error("Unable to read config: {0}")]
    Io(String),
}

/// Transport-level errors.
///
/// Never fatal to the process; converted to a failure return code or an
/// empty result at the device boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Unable to connect to {0}: {1}")]
    Connect(String, String),

    #[error("Not connected")]
    NotConnected,

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Short response (got {got} bytes, expected {expected})")]
    ShortResponse { got: usize, expected: usize },

    #[error("Request failed: {0}")]
    Request(String),
}
