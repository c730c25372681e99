//! Named-flag bitmaps.
//!
//! The module takes two bitmaps built from symbolic names: the set of
//! enabled standard services (`SS`) and the properties of a user
//! characteristic (`PC`). Each domain has a fixed [`BitmaskSpec`] table;
//! a bitmap is the OR of the bits of every listed name the table knows.
//! Unknown names are ignored.

/// Immutable table from flag name to bit value.
#[derive(Debug, Clone, Copy)]
pub struct BitmaskSpec {
    entries: &'static [(&'static str, u32)],
}

impl BitmaskSpec {
    pub const fn new(entries: &'static [(&'static str, u32)]) -> Self {
        Self { entries }
    }

    /// Bit value for a name, if the table defines it.
    pub fn bit(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bit)| *bit)
    }

    /// All names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    /// OR together the bits of every known name in `names`.
    ///
    /// An absent or empty list yields `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use rn4020_client::protocol::bitmap::SERVICES;
    ///
    /// let names = ["battery", "heart_rate", "unknown"];
    /// assert_eq!(SERVICES.build(Some(&names[..])), 0x6000_0000);
    /// assert_eq!(SERVICES.build::<&str>(None), 0);
    /// ```
    pub fn build<S: AsRef<str>>(&self, names: Option<&[S]>) -> u32 {
        let mut bitmap = 0;
        for name in names.unwrap_or_default() {
            match self.bit(name.as_ref()) {
                Some(bit) => bitmap |= bit,
                None => tracing::debug!("Ignoring unknown flag name `{}`", name.as_ref()),
            }
        }
        bitmap
    }
}

/// Service bits for `SS`.
pub mod services {
    pub const DEVICE_INFORMATION: u32 = 0x8000_0000;
    pub const BATTERY: u32 = 0x4000_0000;
    pub const HEART_RATE: u32 = 0x2000_0000;
    pub const HEALTH_THERMOMETER: u32 = 0x1000_0000;
    pub const GLUCOSE: u32 = 0x0800_0000;
    pub const BLOOD_PRESSURE: u32 = 0x0400_0000;
    pub const RUNNING_SPEED_CADENCE: u32 = 0x0200_0000;
    pub const CYCLING_SPEED_CADENCE: u32 = 0x0100_0000;
    pub const CURRENT_TIME: u32 = 0x0080_0000;
    pub const NEXT_DST_CHANGE: u32 = 0x0040_0000;
    pub const REFERENCE_TIME_UPDATE: u32 = 0x0020_0000;
    pub const LINK_LOSS: u32 = 0x0010_0000;
    pub const IMMEDIATE_ALERT: u32 = 0x0008_0000;
    pub const TX_POWER: u32 = 0x0004_0000;
    pub const ALERT_NOTIFICATION: u32 = 0x0002_0000;
    pub const PHONE_ALERT_STATUS: u32 = 0x0001_0000;
    pub const SCAN_PARAMETERS: u32 = 0x0000_4000;
    /// Reserved for the user-defined private service.
    pub const USER: u32 = 0x0000_0001;
}

/// Characteristic property bits for `PC`.
pub mod properties {
    pub const EXTENDED_PROPERTY: u32 = 0x80;
    pub const AUTHENTICATED_WRITE: u32 = 0x40;
    pub const INDICATE: u32 = 0x20;
    pub const NOTIFY: u32 = 0x10;
    pub const WRITE: u32 = 0x08;
    pub const WRITE_WITHOUT_RESPONSE: u32 = 0x04;
    pub const READ: u32 = 0x02;
    pub const BROADCAST: u32 = 0x01;
}

/// Standard services the module can enable.
pub const SERVICES: BitmaskSpec = BitmaskSpec::new(&[
    ("device_information", services::DEVICE_INFORMATION),
    ("battery", services::BATTERY),
    ("heart_rate", services::HEART_RATE),
    ("health_thermometer", services::HEALTH_THERMOMETER),
    ("glucose", services::GLUCOSE),
    ("blood_pressure", services::BLOOD_PRESSURE),
    ("running_speed_cadence", services::RUNNING_SPEED_CADENCE),
    ("cycling_speed_cadence", services::CYCLING_SPEED_CADENCE),
    ("current_time", services::CURRENT_TIME),
    ("next_dst_change", services::NEXT_DST_CHANGE),
    ("reference_time_update", services::REFERENCE_TIME_UPDATE),
    ("link_loss", services::LINK_LOSS),
    ("immediate_alert", services::IMMEDIATE_ALERT),
    ("tx_power", services::TX_POWER),
    ("alert_notification", services::ALERT_NOTIFICATION),
    ("phone_alert_status", services::PHONE_ALERT_STATUS),
    ("scan_parameters", services::SCAN_PARAMETERS),
    ("user", services::USER),
]);

/// Properties a user characteristic can carry.
pub const PROPERTIES: BitmaskSpec = BitmaskSpec::new(&[
    ("extended_property", properties::EXTENDED_PROPERTY),
    ("authenticated_write", properties::AUTHENTICATED_WRITE),
    ("indicate", properties::INDICATE),
    ("notify", properties::NOTIFY),
    ("write", properties::WRITE),
    ("write_without_response", properties::WRITE_WITHOUT_RESPONSE),
    ("read", properties::READ),
    ("broadcast", properties::BROADCAST),
]);
