//! BLE UUIDs as used on the wire.
//!
//! The module addresses services and characteristics either by a 16-bit
//! assigned number or by a full 128-bit UUID. Both are stored as `u128`.
//! Text encoding:
//! - short form (`<= 0xFFFF`): 4 uppercase hex digits
//! - long form: 32 uppercase hex digits, no hyphens

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Rn4020Error;

/// Largest UUID that still uses the 16-bit short form.
pub const SHORT_UUID_MAX: u128 = 0xFFFF;

/// A 16-bit or 128-bit BLE UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "UuidRepr")]
pub struct BleUuid(u128);

impl BleUuid {
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u128 {
        self.0
    }

    /// True when the UUID fits the 16-bit short form.
    #[inline]
    pub const fn is_short(self) -> bool {
        self.0 <= SHORT_UUID_MAX
    }

    /// Always the 32-digit form, as required by `PS` and `PC`.
    pub fn long_hex(self) -> String {
        format!("{:032X}", self.0)
    }

    /// 4 digits for short UUIDs, 32 digits otherwise, as used by `SUR`/`SUW`.
    pub fn address_hex(self) -> String {
        if self.is_short() {
            format!("{:04X}", self.0)
        } else {
            self.long_hex()
        }
    }
}

impl From<u128> for BleUuid {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u16> for BleUuid {
    fn from(value: u16) -> Self {
        Self(value as u128)
    }
}

impl From<uuid::Uuid> for BleUuid {
    fn from(value: uuid::Uuid) -> Self {
        Self(value.as_u128())
    }
}

impl FromStr for BleUuid {
    type Err = Rn4020Error;

    /// Accepts `0x1234`, `1234` (hex) and hyphenated 128-bit UUIDs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('-') {
            return uuid::Uuid::parse_str(s)
                .map(Self::from)
                .map_err(|e| Rn4020Error::Configuration(format!("Invalid UUID `{}`: {}", s, e)));
        }

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > 32 {
            return Err(Rn4020Error::Configuration(format!("Invalid UUID `{}`", s)));
        }

        u128::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| Rn4020Error::Configuration(format!("Invalid UUID `{}`: {}", s, e)))
    }
}

impl fmt::Display for BleUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_hex())
    }
}

/// Accepted JSON shapes for a UUID.
#[derive(Deserialize)]
#[serde(untagged)]
enum UuidRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<UuidRepr> for BleUuid {
    type Error = Rn4020Error;

    fn try_from(repr: UuidRepr) -> Result<Self, Self::Error> {
        match repr {
            UuidRepr::Number(n) => Ok(Self(n as u128)),
            UuidRepr::Text(s) => s.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_long_forms() {
        let short = BleUuid::new(0x1234);
        assert!(short.is_short());
        assert_eq!(short.address_hex(), "1234");
        assert_eq!(short.long_hex(), "00000000000000000000000000001234");

        let long = BleUuid::new(0x123456789ABCDEF0123456789ABCDEF0);
        assert!(!long.is_short());
        assert_eq!(long.address_hex(), "123456789ABCDEF0123456789ABCDEF0");
    }

    #[test]
    fn test_short_form_boundary() {
        assert_eq!(BleUuid::new(0xFFFF).address_hex(), "FFFF");
        assert_eq!(
            BleUuid::new(0x1_0000).address_hex(),
            "00000000000000000000000000010000"
        );
        assert_eq!(BleUuid::new(0x2A).address_hex(), "002A");
    }

    #[test]
    fn test_parse_text_forms() {
        assert_eq!("0x180F".parse::<BleUuid>().unwrap().value(), 0x180F);
        assert_eq!("180f".parse::<BleUuid>().unwrap().value(), 0x180F);
        assert_eq!(
            "b40e1000-5e7c-1c3e-0000-000000000000"
                .parse::<BleUuid>()
                .unwrap()
                .value(),
            0xb40e10005e7c1c3e0000000000000000
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<BleUuid>().is_err());
        assert!("0x".parse::<BleUuid>().is_err());
        assert!("xyz".parse::<BleUuid>().is_err());
        assert!("not-a-uuid".parse::<BleUuid>().is_err());
        assert!("1".repeat(33).parse::<BleUuid>().is_err());
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let n: BleUuid = serde_json::from_str("4660").unwrap();
        assert_eq!(n.value(), 0x1234);

        let s: BleUuid = serde_json::from_str("\"0x123456789ABCDEF0123456789ABCDEF0\"").unwrap();
        assert_eq!(s.value(), 0x123456789ABCDEF0123456789ABCDEF0);

        assert!(serde_json::from_str::<BleUuid>("\"zz\"").is_err());
    }
}
