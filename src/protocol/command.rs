//! Command wire format.
//!
//! Every command is one text line: a mnemonic, optionally followed by
//! comma-separated arguments. Numeric arguments are fixed-width uppercase
//! hex:
//!
//! ```text
//! SS,40000000            services bitmap, 8 digits
//! ST,0010,0002,0064      interval, latency, timeout, 4 digits each
//! PC,<32 digits>,12,14   characteristic UUID, properties, size
//! ```
//!
//! The line terminator is not part of the encoding; the channel appends it.

use std::fmt;

use super::ble_uuid::BleUuid;

/// Fixed peripheral-role bits for `SR`.
pub mod features {
    /// Start advertising after power-on or disconnect.
    pub const AUTO_ADVERTISE: u32 = 0x2000_0000;
    /// Client compatibility mode required by iOS centrals.
    pub const IOS_MODE: u32 = 0x0000_4000;
    /// Act as GATT server only.
    pub const SERVER_ONLY: u32 = 0x0000_2000;

    /// Role used for peripheral operation (`SR,20006000`).
    pub const PERIPHERAL: u32 = AUTO_ADVERTISE | IOS_MODE | SERVER_ONLY;
}

/// Device Information Service field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    Firmware,
    Hardware,
    Model,
    Manufacturer,
    Software,
}

impl InfoField {
    /// Fields in the order they are configured.
    pub const ALL: [InfoField; 5] = [
        InfoField::Firmware,
        InfoField::Hardware,
        InfoField::Model,
        InfoField::Manufacturer,
        InfoField::Software,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            InfoField::Firmware => "SDF",
            InfoField::Hardware => "SDH",
            InfoField::Model => "SDM",
            InfoField::Manufacturer => "SDN",
            InfoField::Software => "SDR",
        }
    }
}

/// One protocol instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `V`: firmware version, used as a sync probe at startup.
    Version,
    /// `SN`: plain device name.
    SetName(String),
    /// `S-`: serialized device name (module appends part of its MAC).
    SetSerializedName(String),
    /// `SDF`/`SDH`/`SDM`/`SDN`/`SDR`: Device Information field.
    SetDeviceInfo(InfoField, String),
    /// `SR`: supported features / role bitmap.
    SetFeatures(u32),
    /// `SS`: enabled services bitmap.
    SetServices(u32),
    /// `ST`: connection interval, slave latency, supervision timeout.
    SetTiming { interval: u16, latency: u16, timeout: u16 },
    /// `PZ`: clear the private (user) service.
    ClearPrivateService,
    /// `PS`: private service UUID.
    SetPrivateService(BleUuid),
    /// `PC`: private characteristic.
    CreateCharacteristic {
        uuid: BleUuid,
        properties: u8,
        size: u8,
    },
    /// `SUR`: read a server characteristic.
    ReadCharacteristic(BleUuid),
    /// `SUW`: write a server characteristic; `data` is a hex string.
    WriteCharacteristic { uuid: BleUuid, data: String },
    /// `R,1`: reboot to apply configuration.
    Reboot,
}

impl Command {
    /// Command mnemonic without arguments.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Command::Version => "V",
            Command::SetName(_) => "SN",
            Command::SetSerializedName(_) => "S-",
            Command::SetDeviceInfo(field, _) => field.mnemonic(),
            Command::SetFeatures(_) => "SR",
            Command::SetServices(_) => "SS",
            Command::SetTiming { .. } => "ST",
            Command::ClearPrivateService => "PZ",
            Command::SetPrivateService(_) => "PS",
            Command::CreateCharacteristic { .. } => "PC",
            Command::ReadCharacteristic(_) => "SUR",
            Command::WriteCharacteristic { .. } => "SUW",
            Command::Reboot => "R",
        }
    }

    /// Encode to a command line (terminator excluded).
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self {
            Command::Version | Command::ClearPrivateService => f.write_str(m),
            Command::SetName(name) | Command::SetSerializedName(name) => {
                write!(f, "{},{}", m, name)
            }
            Command::SetDeviceInfo(_, value) => write!(f, "{},{}", m, value),
            Command::SetFeatures(bits) | Command::SetServices(bits) => {
                write!(f, "{},{:08X}", m, bits)
            }
            Command::SetTiming {
                interval,
                latency,
                timeout,
            } => write!(f, "{},{:04X},{:04X},{:04X}", m, interval, latency, timeout),
            Command::SetPrivateService(uuid) => write!(f, "{},{}", m, uuid.long_hex()),
            Command::CreateCharacteristic {
                uuid,
                properties,
                size,
            } => write!(
                f,
                "{},{},{:02X},{:02X}",
                m,
                uuid.long_hex(),
                properties,
                size
            ),
            Command::ReadCharacteristic(uuid) => write!(f, "{},{}", m, uuid.address_hex()),
            Command::WriteCharacteristic { uuid, data } => {
                write!(f, "{},{},{}", m, uuid.address_hex(), data)
            }
            Command::Reboot => write!(f, "{},1", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_commands() {
        assert_eq!(Command::Version.encode(), "V");
        assert_eq!(Command::ClearPrivateService.encode(), "PZ");
        assert_eq!(Command::Reboot.encode(), "R,1");
    }

    #[test]
    fn test_peripheral_role() {
        assert_eq!(features::PERIPHERAL, 0x2000_6000);
        assert_eq!(
            Command::SetFeatures(features::PERIPHERAL).encode(),
            "SR,20006000"
        );
    }

    #[test]
    fn test_names_and_info() {
        assert_eq!(Command::SetName("Foo_Bar".into()).encode(), "SN,Foo_Bar");
        assert_eq!(Command::SetSerializedName("Foo".into()).encode(), "S-,Foo");
        assert_eq!(
            Command::SetDeviceInfo(InfoField::Manufacturer, "Acme".into()).encode(),
            "SDN,Acme"
        );
        let mnemonics: Vec<_> = InfoField::ALL.iter().map(|f| f.mnemonic()).collect();
        assert_eq!(mnemonics, ["SDF", "SDH", "SDM", "SDN", "SDR"]);
    }

    #[test]
    fn test_hex_widths() {
        assert_eq!(Command::SetServices(0x4000_0000).encode(), "SS,40000000");
        assert_eq!(Command::SetServices(1).encode(), "SS,00000001");
        assert_eq!(
            Command::SetTiming {
                interval: 16,
                latency: 2,
                timeout: 100
            }
            .encode(),
            "ST,0010,0002,0064"
        );
    }

    #[test]
    fn test_private_service_commands() {
        let uuid = BleUuid::new(0x1234);
        assert_eq!(
            Command::SetPrivateService(uuid).encode(),
            "PS,00000000000000000000000000001234"
        );
        assert_eq!(
            Command::CreateCharacteristic {
                uuid,
                properties: 0x12,
                size: 20
            }
            .encode(),
            "PC,00000000000000000000000000001234,12,14"
        );
    }

    #[test]
    fn test_characteristic_access_uses_short_form() {
        assert_eq!(
            Command::ReadCharacteristic(BleUuid::new(0x1234)).encode(),
            "SUR,1234"
        );
        assert_eq!(
            Command::ReadCharacteristic(BleUuid::new(0x123456789ABCDEF0123456789ABCDEF0)).encode(),
            "SUR,123456789ABCDEF0123456789ABCDEF0"
        );
        assert_eq!(
            Command::WriteCharacteristic {
                uuid: BleUuid::new(0x2A19),
                data: "64".into()
            }
            .encode(),
            "SUW,2A19,64"
        );
    }
}
