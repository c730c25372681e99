//! Configuration-to-command translation.
//!
//! [`plan_setup`] turns a [`ModuleConfig`] into the ordered command list
//! that brings the module into that state:
//!
//! 1. name (`SN` or `S-`)
//! 2. Device Information fields (`SDF`, `SDH`, `SDM`, `SDN`, `SDR`)
//! 3. peripheral role (`SR,20006000`), always
//! 4. services bitmap (`SS`), always
//! 5. timing (`ST`)
//! 6. private service (`PZ`, `PS`, then one `PC` per characteristic)
//! 7. reboot (`R,1`), always
//!
//! Planning is pure and fails before anything is transmitted. [`setup`]
//! then sends the plan one command at a time, each response awaited before
//! the next command goes out.

use crate::channel::CommandChannel;
use crate::clock::Clock;
use crate::config::{ModuleConfig, MAX_INFO_LEN, MAX_NAME_LEN, MAX_SERIALIZED_NAME_LEN};
use crate::error::{Result, Rn4020Error};
use crate::protocol::bitmap::services;
use crate::protocol::{features, BleUuid, Command, InfoField, Line, PROPERTIES, SERVICES};
use crate::transport::Transport;

/// Build the full command sequence for `config`.
///
/// # Example
///
/// ```
/// use rn4020_client::config::ModuleConfig;
/// use rn4020_client::translator::plan_setup;
///
/// let config = ModuleConfig {
///     name: Some("Foo Bar".into()),
///     services: Some(vec!["battery".into()]),
///     ..ModuleConfig::default()
/// };
///
/// let lines: Vec<String> = plan_setup(&config).unwrap().iter().map(|c| c.encode()).collect();
/// assert_eq!(lines, ["SN,Foo_Bar", "SR,20006000", "SS,40000000", "R,1"]);
/// ```
pub fn plan_setup(config: &ModuleConfig) -> Result<Vec<Command>> {
    config.validate()?;

    let mut plan = Vec::new();

    if let Some(name) = &config.name {
        plan.push(name_command(name, config.serialize_name));
    }

    if let Some(info) = &config.device_information {
        let values = [
            &info.firmware,
            &info.hardware,
            &info.model,
            &info.manufacturer,
            &info.software,
        ];
        for (field, value) in InfoField::ALL.into_iter().zip(values) {
            if let Some(value) = value {
                plan.push(Command::SetDeviceInfo(
                    field,
                    truncate_chars(value, MAX_INFO_LEN),
                ));
            }
        }
    }

    plan.push(Command::SetFeatures(features::PERIPHERAL));
    plan.push(Command::SetServices(service_bitmap(config)));

    if let Some(timing) = &config.timing {
        plan.push(Command::SetTiming {
            interval: timing.interval(),
            latency: timing.latency(),
            timeout: timing.timeout(),
        });
    }

    if let Some(service) = &config.user_service {
        if let Some(uuid) = service.uuid {
            plan.push(Command::ClearPrivateService);
            plan.push(Command::SetPrivateService(uuid));

            for (i, characteristic) in service.characteristics.iter().flatten().enumerate() {
                let Some(uuid) = characteristic.uuid else {
                    tracing::warn!("Skipping characteristic {} without UUID", i);
                    continue;
                };

                // Every property bit lies in the low byte.
                let properties = PROPERTIES.build(characteristic.properties.as_deref()) as u8;

                plan.push(Command::CreateCharacteristic {
                    uuid,
                    properties,
                    size: characteristic.effective_size(),
                });
            }
        }
    }

    plan.push(Command::Reboot);
    Ok(plan)
}

/// Apply `config` to the module.
///
/// Stale input is discarded first. Returns the response to each command in
/// plan order. Any failure aborts the sequence and leaves the module
/// partially configured; re-run from a clean state.
pub fn setup<T: Transport, C: Clock>(
    channel: &mut CommandChannel<T, C>,
    config: &ModuleConfig,
) -> Result<Vec<Line>> {
    let plan = plan_setup(config)?;

    channel.reset_input()?;

    let mut responses = Vec::with_capacity(plan.len());
    for command in &plan {
        responses.push(channel.execute(command)?);
    }

    tracing::info!("Applied configuration with {} commands", plan.len());
    Ok(responses)
}

/// Services bitmap for `SS`.
///
/// The user bit is forced on whenever a private service block is present.
pub fn service_bitmap(config: &ModuleConfig) -> u32 {
    let mut bitmap = SERVICES.build(config.services.as_deref());
    if config.user_service.is_some() {
        bitmap |= services::USER;
    }
    bitmap
}

/// Naming command for `name`: truncated, spaces replaced by underscores.
pub fn name_command(name: &str, serialized: bool) -> Command {
    if serialized {
        Command::SetSerializedName(
            truncate_chars(name, MAX_SERIALIZED_NAME_LEN).replace(' ', "_"),
        )
    } else {
        Command::SetName(truncate_chars(name, MAX_NAME_LEN).replace(' ', "_"))
    }
}

/// Read a server characteristic. Stale input is discarded first so the
/// value is not confused with an earlier notification.
pub fn read_characteristic<T: Transport, C: Clock>(
    channel: &mut CommandChannel<T, C>,
    uuid: BleUuid,
) -> Result<Line> {
    channel.reset_input()?;
    channel.execute(&Command::ReadCharacteristic(uuid))
}

/// Read a server characteristic and decode its hex value.
pub fn read_characteristic_bytes<T: Transport, C: Clock>(
    channel: &mut CommandChannel<T, C>,
    uuid: BleUuid,
) -> Result<Vec<u8>> {
    let line = read_characteristic(channel, uuid)?;
    if line.is_error() {
        return Err(Rn4020Error::Protocol(format!(
            "module rejected read of characteristic {}",
            uuid
        )));
    }
    line.decode_hex()
}

/// Write a server characteristic. `hex_data` must be an even-length hex
/// string sized for the characteristic.
pub fn write_characteristic<T: Transport, C: Clock>(
    channel: &mut CommandChannel<T, C>,
    uuid: BleUuid,
    hex_data: &str,
) -> Result<Line> {
    if hex_data.is_empty() {
        return Err(Rn4020Error::Configuration(
            "characteristic data must not be empty".to_string(),
        ));
    }
    hex::decode(hex_data).map_err(|e| {
        Rn4020Error::Configuration(format!("characteristic data `{}` is not hex: {}", hex_data, e))
    })?;

    channel.execute(&Command::WriteCharacteristic {
        uuid,
        data: hex_data.to_string(),
    })
}

/// Write raw bytes to a server characteristic.
pub fn write_characteristic_bytes<T: Transport, C: Clock>(
    channel: &mut CommandChannel<T, C>,
    uuid: BleUuid,
    data: &[u8],
) -> Result<Line> {
    write_characteristic(channel, uuid, &hex::encode_upper(data))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacteristicSpec, DeviceInformation, Timing, UserServiceSpec};
    use crate::transport::MemoryTransport;

    fn encoded(config: &ModuleConfig) -> Vec<String> {
        plan_setup(config)
            .unwrap()
            .iter()
            .map(Command::encode)
            .collect()
    }

    fn acking_channel(responses: usize) -> CommandChannel<MemoryTransport> {
        let mut transport = MemoryTransport::new();
        for _ in 0..responses {
            transport.push_line("AOK");
        }
        CommandChannel::new(transport)
    }

    #[test]
    fn test_minimal_plan() {
        assert_eq!(encoded(&ModuleConfig::default()), ["SR,20006000", "SS,00000000", "R,1"]);
    }

    #[test]
    fn test_plain_name() {
        assert_eq!(
            name_command("My Device Name", false).encode(),
            "SN,My_Device_Name"
        );
    }

    #[test]
    fn test_plain_name_truncated_to_20() {
        assert_eq!(
            name_command("abcdefghij klmnopqrstuvwxyz", false).encode(),
            "SN,abcdefghij_klmnopqrs"
        );
    }

    #[test]
    fn test_serialized_name_truncated_to_15() {
        assert_eq!(
            name_command("ABCDEFGHIJKLMNOPQ", true).encode(),
            "S-,ABCDEFGHIJKLMNO"
        );
        // Truncation happens before substitution.
        assert_eq!(
            name_command("A B C D E F G H I", true).encode(),
            "S-,A_B_C_D_E_F_G_H"
        );
    }

    #[test]
    fn test_truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_device_information_order() {
        let config = ModuleConfig {
            device_information: Some(DeviceInformation {
                software: Some("2.0".into()),
                manufacturer: Some("A Very Long Manufacturer Name".into()),
                firmware: Some("1.0".into()),
                ..DeviceInformation::default()
            }),
            ..ModuleConfig::default()
        };

        assert_eq!(
            encoded(&config),
            [
                "SDF,1.0",
                "SDN,A Very Long Manufact",
                "SDR,2.0",
                "SR,20006000",
                "SS,00000000",
                "R,1"
            ]
        );
    }

    #[test]
    fn test_timing_defaults_and_overrides() {
        let config = ModuleConfig {
            timing: Some(Timing {
                timeout: Some(0x0200),
                ..Timing::default()
            }),
            ..ModuleConfig::default()
        };

        assert_eq!(encoded(&config)[2], "ST,0010,0002,0200");
    }

    #[test]
    fn test_user_service_forces_user_bit() {
        let config = ModuleConfig {
            services: Some(vec!["battery".into()]),
            user_service: Some(UserServiceSpec::default()),
            ..ModuleConfig::default()
        };

        assert_eq!(service_bitmap(&config), 0x4000_0001);
        // No UUID: bit only, no PZ/PS.
        assert_eq!(encoded(&config), ["SR,20006000", "SS,40000001", "R,1"]);
    }

    #[test]
    fn test_user_service_with_characteristics() {
        let config = ModuleConfig {
            user_service: Some(UserServiceSpec {
                uuid: Some(BleUuid::new(0x11223344556677889900AABBCCDDEEFF)),
                characteristics: Some(vec![
                    CharacteristicSpec {
                        uuid: Some(BleUuid::new(0x0102)),
                        properties: Some(vec!["read".into(), "notify".into(), "bogus".into()]),
                        size: Some(4),
                    },
                    CharacteristicSpec {
                        uuid: None,
                        properties: Some(vec!["write".into()]),
                        size: None,
                    },
                    CharacteristicSpec {
                        uuid: Some(BleUuid::new(0x0103)),
                        properties: None,
                        size: Some(64),
                    },
                ]),
            }),
            ..ModuleConfig::default()
        };

        assert_eq!(
            encoded(&config),
            [
                "SR,20006000",
                "SS,00000001",
                "PZ",
                "PS,11223344556677889900AABBCCDDEEFF",
                "PC,00000000000000000000000000000102,12,04",
                "PC,00000000000000000000000000000103,00,14",
                "R,1"
            ]
        );
    }

    #[test]
    fn test_oversized_characteristic_clamped() {
        let config = ModuleConfig::from_json_str(
            r#"{ "user_service": { "uuid": 1, "characteristics": [ { "uuid": 2, "size": 300 } ] } }"#,
        )
        .unwrap();

        assert_eq!(
            encoded(&config)[4],
            "PC,00000000000000000000000000000002,00,14"
        );
    }

    #[test]
    fn test_setup_rejects_line_break_without_sending() {
        let config = ModuleConfig {
            name: Some("Foo\nR,1".into()),
            ..ModuleConfig::default()
        };

        let mut channel = acking_channel(6);
        let err = setup(&mut channel, &config).unwrap_err();

        assert!(matches!(err, Rn4020Error::Configuration(_)));
        assert!(channel.transport().written().is_empty());
    }

    #[test]
    fn test_invalid_config_fails_before_planning() {
        let config = ModuleConfig {
            name: Some(String::new()),
            ..ModuleConfig::default()
        };
        assert!(matches!(
            plan_setup(&config),
            Err(Rn4020Error::Configuration(_))
        ));
    }

    #[test]
    fn test_setup_sends_plan_in_order() {
        let config = ModuleConfig {
            name: Some("Foo Bar".into()),
            services: Some(vec!["battery".into()]),
            ..ModuleConfig::default()
        };

        let mut channel = CommandChannel::new(MemoryTransport::new());
        // Responses arrive only after setup discarded stale input.
        channel.transport_mut().push_line("stale").push_empty_polls(1);
        for _ in 0..4 {
            channel.transport_mut().push_line("AOK");
        }

        let responses = setup(&mut channel, &config).unwrap();

        assert_eq!(responses.len(), 4);
        assert!(responses.iter().all(Line::is_ack));
        assert_eq!(
            channel.transport().written_lines(),
            ["SN,Foo_Bar", "SR,20006000", "SS,40000000", "R,1"]
        );
    }

    #[test]
    fn test_setup_rejects_config_without_sending() {
        let config = ModuleConfig {
            user_service: Some(UserServiceSpec {
                uuid: None,
                characteristics: Some(vec![CharacteristicSpec::default()]),
            }),
            ..ModuleConfig::default()
        };

        let mut channel = acking_channel(4);
        assert!(setup(&mut channel, &config).is_err());
        assert!(channel.transport().written().is_empty());
    }

    #[test]
    fn test_setup_aborts_on_transport_error() {
        let mut channel = acking_channel(1);
        channel
            .transport_mut()
            .fail_writes(std::io::ErrorKind::BrokenPipe);

        let err = setup(&mut channel, &ModuleConfig::default()).unwrap_err();
        assert!(matches!(err, Rn4020Error::Transport(_)));
    }

    #[test]
    fn test_read_characteristic_short_and_long() {
        let mut channel = CommandChannel::new(MemoryTransport::new());

        channel.transport_mut().push_empty_polls(1).push_line("0A0B");
        let line = read_characteristic(&mut channel, BleUuid::new(0x1234)).unwrap();
        assert_eq!(line.text(), "0A0B");

        channel.transport_mut().push_empty_polls(1).push_line("01");
        read_characteristic(&mut channel, BleUuid::new(0x123456789ABCDEF0123456789ABCDEF0))
            .unwrap();

        assert_eq!(
            channel.transport().written_lines(),
            ["SUR,1234", "SUR,123456789ABCDEF0123456789ABCDEF0"]
        );
    }

    #[test]
    fn test_read_discards_stale_input() {
        let mut transport = MemoryTransport::new();
        transport.push_line("WV,001B,FF.");
        let mut channel = CommandChannel::new(transport);

        channel.drain_all().unwrap();
        channel.transport_mut().push_chunk(b"Connec");
        channel.transport_mut().push_empty_polls(1).push_line("64");

        // "Connec" is consumed by the discard; the empty poll stops it.
        assert_eq!(
            read_characteristic_bytes(&mut channel, BleUuid::new(0x2A19)).unwrap(),
            vec![0x64]
        );
    }

    #[test]
    fn test_read_characteristic_bytes_rejected() {
        let mut channel = CommandChannel::new(MemoryTransport::new());
        channel.transport_mut().push_empty_polls(1).push_line("ERR");

        let err = read_characteristic_bytes(&mut channel, BleUuid::new(0x2A19)).unwrap_err();
        assert!(matches!(err, Rn4020Error::Protocol(_)));
    }

    #[test]
    fn test_write_characteristic_commands() {
        let mut channel = CommandChannel::new(MemoryTransport::new());
        channel.transport_mut().push_line("AOK");

        write_characteristic(&mut channel, BleUuid::new(0x2A19), "64").unwrap();
        channel.transport_mut().push_line("AOK");
        write_characteristic_bytes(
            &mut channel,
            BleUuid::new(0x123456789ABCDEF0123456789ABCDEF0),
            &[0xde, 0xad],
        )
        .unwrap();

        assert_eq!(
            channel.transport().written_lines(),
            ["SUW,2A19,64", "SUW,123456789ABCDEF0123456789ABCDEF0,DEAD"]
        );
    }

    #[test]
    fn test_write_characteristic_validates_data() {
        let mut channel = acking_channel(3);
        let uuid = BleUuid::new(0x2A19);

        assert!(write_characteristic(&mut channel, uuid, "").is_err());
        assert!(write_characteristic(&mut channel, uuid, "ABC").is_err());
        assert!(write_characteristic(&mut channel, uuid, "ZZ").is_err());
        assert!(channel.transport().written().is_empty());
    }
}
