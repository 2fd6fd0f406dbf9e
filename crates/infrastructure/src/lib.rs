//! Infrastructure layer - transport implementations and configuration loading

pub mod config;
pub mod transports;

pub use config::{
    ActivityConfig, DeviceConfig, ServerConfig, StatusCommandConfig, TransportConfig,
};
pub use transports::{HttpConfig, HttpTransport, SerialConfig, SerialTransport, TransportFactory};
