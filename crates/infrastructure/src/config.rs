//! Configuration loading: server settings plus per-entity device and
//! activity definition files.
//!
//! The server config comes from an optional TOML file merged with `RCD`
//! prefixed environment variables. Devices and activities are one TOML file
//! per entry inside their configured directories; a file that fails to parse
//! is logged and skipped so the rest of the registry still loads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use domain::{ConfigError, Device, ResponseMatch, ResultType, StatusCommand, TransportKind};

use crate::transports::{HttpConfig, SerialConfig};

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_host: String,
    pub listen_port: u16,
    pub devices_dir: String,
    pub activities_dir: String,
}

impl ServerConfig {
    /// Load the server configuration.
    ///
    /// Defaults are overridden by the config file (when given), which is in
    /// turn overridden by `RCD`-prefixed environment variables, e.g.
    /// `RCD__LISTEN_PORT=9000`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("listen_host", "0.0.0.0")?
            .set_default("listen_port", 4489)?
            .set_default("devices_dir", "config/devices")?
            .set_default("activities_dir", "config/activities")?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("RCD").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Per-device transport parameters, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    Serial(SerialConfig),
    Http(HttpConfig),
}

impl TransportConfig {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Serial(_) => TransportKind::Stream,
            Self::Http(_) => TransportKind::Request,
        }
    }
}

/// Raw status command definition as written in a device file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCommandConfig {
    pub payload: String,
    #[serde(default)]
    pub response_len: usize,
    /// Byte range expression, e.g. `":-2"`; empty selects everything
    #[serde(default)]
    pub window: String,
    /// Bitwise expression applied to integer results, e.g. `"& 0x03"`
    #[serde(default)]
    pub bit_filter: Option<String>,
    #[serde(default)]
    pub result_type: ResultType,
    /// Ordered (label, pattern) pairs; declaration order decides matches
    #[serde(default)]
    pub responses: Vec<(String, String)>,
}

/// Raw device definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub transport: TransportConfig,
    #[serde(default)]
    pub buttons: BTreeMap<String, String>,
    #[serde(default)]
    pub status_cmds: BTreeMap<String, StatusCommandConfig>,
}

impl DeviceConfig {
    /// Build the domain device: escape-decoded payloads for stream devices,
    /// prebuilt URLs for request devices.
    pub fn to_device(&self) -> Result<Device, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name".to_string()));
        }

        // A missing description falls back to the device name.
        let description = if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        };
        let mut device = Device::new(&self.name, description);

        for (button, payload) in &self.buttons {
            device
                .buttons
                .insert(button.clone(), self.payload_bytes(payload)?);
        }

        for (name, cmd) in &self.status_cmds {
            device
                .status_cmds
                .insert(name.clone(), self.to_status_cmd(name, cmd)?);
        }

        Ok(device)
    }

    fn payload_bytes(&self, payload: &str) -> Result<Vec<u8>, ConfigError> {
        match &self.transport {
            TransportConfig::Serial(_) => decode_escapes(payload),
            // URL suffixes become full URLs once, at load time.
            TransportConfig::Http(http) => {
                Ok(format!("{}/{}", http.base_url(), payload).into_bytes())
            }
        }
    }

    fn to_status_cmd(
        &self,
        name: &str,
        cmd: &StatusCommandConfig,
    ) -> Result<StatusCommand, ConfigError> {
        let mut built = StatusCommand::new(name, self.payload_bytes(&cmd.payload)?, cmd.response_len);
        built.window = cmd.window.parse()?;
        built.bit_op = cmd.bit_filter.as_deref().map(str::parse).transpose()?;
        built.result_type = cmd.result_type;
        built.responses = cmd
            .responses
            .iter()
            .map(|(label, pattern)| ResponseMatch::new(label.as_str(), pattern))
            .collect::<Result<_, _>>()?;
        Ok(built)
    }
}

/// Raw activity definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Devices pressed "on" when the activity starts
    #[serde(default)]
    pub on_devices: Vec<String>,
    /// Input presses in `"device.button"` form, run in declaration order
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl ActivityConfig {
    /// Split the `device.button` input entries
    pub fn parsed_inputs(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.inputs
            .iter()
            .map(|entry| match entry.split_once('.') {
                Some((device, button)) if !device.is_empty() && !button.is_empty() => {
                    Ok((device.to_string(), button.to_string()))
                }
                _ => Err(ConfigError::InvalidField(format!(
                    "input entry {entry:?} is not in device.button form"
                ))),
            })
            .collect()
    }
}

/// Decode backslash escapes (`\x4F`, `\r`, `\n`, `\t`, `\0`, `\\`) into raw
/// bytes. Payloads are decoded once at load time, never per press.
pub fn decode_escapes(text: &str) -> Result<Vec<u8>, ConfigError> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        match chars.next() {
            Some('x') => {
                let (Some(hi), Some(lo)) = (chars.next(), chars.next()) else {
                    return Err(ConfigError::InvalidField(format!(
                        "truncated hex escape in {text:?}"
                    )));
                };
                let value = u8::from_str_radix(&format!("{hi}{lo}"), 16).map_err(|_| {
                    ConfigError::InvalidField(format!("invalid hex escape \\x{hi}{lo} in {text:?}"))
                })?;
                bytes.push(value);
            }
            Some('r') => bytes.push(b'\r'),
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('0') => bytes.push(0),
            Some('\\') => bytes.push(b'\\'),
            other => {
                return Err(ConfigError::InvalidField(format!(
                    "unsupported escape {:?} in {text:?}",
                    other.map(|c| format!("\\{c}")).unwrap_or_else(|| "\\".to_string())
                )));
            }
        }
    }

    Ok(bytes)
}

/// Load every `*.toml` device definition in `dir`
pub fn load_device_configs(dir: &Path) -> Result<Vec<DeviceConfig>, ConfigError> {
    load_dir(dir, "device")
}

/// Load every `*.toml` activity definition in `dir`
pub fn load_activity_configs(dir: &Path) -> Result<Vec<ActivityConfig>, ConfigError> {
    load_dir(dir, "activity")
}

fn load_dir<T: DeserializeOwned>(dir: &Path, what: &str) -> Result<Vec<T>, ConfigError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ConfigError::Io(format!("{}: {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut configs = Vec::new();
    for path in paths {
        tracing::info!(file = %path.display(), "Parsing {} config file", what);
        match read_toml(&path) {
            Ok(config) => configs.push(config),
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Unable to load {} config, skipping", what);
            }
        }
    }
    Ok(configs)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
    toml::from_str(&content).map_err(|e| ConfigError::InvalidField(e.to_string()))
}
