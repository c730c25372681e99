//! Declarative module configuration.
//!
//! Every section is optional; an absent section produces no commands. The
//! configuration is usually loaded from JSON:
//!
//! ```
//! use rn4020_client::config::ModuleConfig;
//!
//! let config = ModuleConfig::from_json_str(r#"{
//!     "name": "Foo Bar",
//!     "services": ["battery"],
//!     "timing": { "interval": 24 },
//!     "user_service": {
//!         "uuid": "0x11223344556677889900AABBCCDDEEFF",
//!         "characteristics": [
//!             { "uuid": "0x0102", "properties": ["read", "notify"], "size": 4 }
//!         ]
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.name.as_deref(), Some("Foo Bar"));
//! assert_eq!(config.timing.unwrap().interval(), 24);
//! ```
//!
//! UUIDs may be JSON integers (up to 64 bits) or strings: `"0x180F"`,
//! `"180F"`, or the hyphenated 128-bit form.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, Rn4020Error};
use crate::protocol::BleUuid;

/// Longest name accepted by `SN`.
pub const MAX_NAME_LEN: usize = 20;

/// Longest name accepted by `S-` (the module appends part of its MAC).
pub const MAX_SERIALIZED_NAME_LEN: usize = 15;

/// Longest Device Information value.
pub const MAX_INFO_LEN: usize = 20;

/// Largest characteristic value size, also the default.
pub const MAX_CHARACTERISTIC_SIZE: u8 = 20;

/// Default connection interval, in 1.25 ms units.
pub const DEFAULT_INTERVAL: u16 = 16;

/// Default slave latency, in connection events.
pub const DEFAULT_LATENCY: u16 = 2;

/// Default supervision timeout, in 10 ms units.
pub const DEFAULT_TIMEOUT: u16 = 100;

/// Full configuration applied by `setup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Advertised device name.
    #[serde(default)]
    pub name: Option<String>,
    /// Use `S-` so the module appends a MAC suffix to the name.
    #[serde(default)]
    pub serialize_name: bool,
    #[serde(default)]
    pub device_information: Option<DeviceInformation>,
    /// Standard service names, see [`crate::protocol::SERVICES`].
    #[serde(default)]
    pub services: Option<Vec<String>>,
    #[serde(default)]
    pub timing: Option<Timing>,
    #[serde(default)]
    pub user_service: Option<UserServiceSpec>,
}

/// Device Information Service values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceInformation {
    #[serde(default)]
    pub firmware: Option<String>,
    #[serde(default)]
    pub hardware: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub software: Option<String>,
}

/// Connection timing. Unset values fall back to iOS-friendly defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timing {
    #[serde(default)]
    pub interval: Option<u16>,
    #[serde(default)]
    pub latency: Option<u16>,
    #[serde(default)]
    pub timeout: Option<u16>,
}

impl Timing {
    pub fn interval(&self) -> u16 {
        self.interval.unwrap_or(DEFAULT_INTERVAL)
    }

    pub fn latency(&self) -> u16 {
        self.latency.unwrap_or(DEFAULT_LATENCY)
    }

    pub fn timeout(&self) -> u16 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// User-defined private service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserServiceSpec {
    #[serde(default)]
    pub uuid: Option<BleUuid>,
    #[serde(default)]
    pub characteristics: Option<Vec<CharacteristicSpec>>,
}

/// One characteristic of the private service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacteristicSpec {
    #[serde(default)]
    pub uuid: Option<BleUuid>,
    /// Property names, see [`crate::protocol::PROPERTIES`].
    #[serde(default)]
    pub properties: Option<Vec<String>>,
    /// Value size in bytes; clamped to [`MAX_CHARACTERISTIC_SIZE`].
    #[serde(default)]
    pub size: Option<u32>,
}

impl CharacteristicSpec {
    /// Size actually sent to the module.
    pub fn effective_size(&self) -> u8 {
        match self.size {
            Some(size) => u8::try_from(size)
                .unwrap_or(MAX_CHARACTERISTIC_SIZE)
                .min(MAX_CHARACTERISTIC_SIZE),
            None => MAX_CHARACTERISTIC_SIZE,
        }
    }
}

impl DeviceInformation {
    /// Values paired with their field names, in configuration order.
    fn fields(&self) -> [(&'static str, &Option<String>); 5] {
        [
            ("firmware", &self.firmware),
            ("hardware", &self.hardware),
            ("model", &self.model),
            ("manufacturer", &self.manufacturer),
            ("software", &self.software),
        ]
    }
}

/// Reject values that would split one command into several lines.
fn check_single_line(field: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_control) {
        return Err(Rn4020Error::Configuration(format!(
            "{} contains control characters: {:?}",
            field, value
        )));
    }
    Ok(())
}

impl ModuleConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Rn4020Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded module configuration from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Reject values that cannot be turned into valid commands.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Rn4020Error::Configuration(
                    "device name must not be empty".to_string(),
                ));
            }
            check_single_line("device name", name)?;
        }

        if let Some(info) = &self.device_information {
            for (field, value) in info.fields() {
                if let Some(value) = value {
                    check_single_line(field, value)?;
                }
            }
        }

        if let Some(service) = &self.user_service {
            let characteristics = service.characteristics.as_deref().unwrap_or_default();

            if service.uuid.is_none() && !characteristics.is_empty() {
                return Err(Rn4020Error::Configuration(
                    "user service declares characteristics but has no UUID".to_string(),
                ));
            }

            for (i, characteristic) in characteristics.iter().enumerate() {
                if characteristic.size == Some(0) {
                    return Err(Rn4020Error::Configuration(format!(
                        "characteristic {} has size 0",
                        i
                    )));
                }
            }
        }

        Ok(())
    }
}
