//! Device capability constants and compound attribute values.

use std::fmt;
use std::str::FromStr;

use wsc_core::error::ConfigError;

/// Wi-Fi Alliance OUI.
pub const WFA_OUI: [u8; 3] = [0x00, 0x37, 0x2a];

/// Authentication Type Flags bits.
pub mod auth_type {
    pub const OPEN: u16 = 0x0001;
    pub const WPA_PERSONAL: u16 = 0x0002;
    pub const SHARED: u16 = 0x0004;
    pub const WPA_ENTERPRISE: u16 = 0x0008;
    pub const WPA2_ENTERPRISE: u16 = 0x0010;
    pub const WPA2_PERSONAL: u16 = 0x0020;
}

/// Encryption Type Flags bits.
pub mod encryption_type {
    pub const NONE: u16 = 0x0001;
    pub const WEP: u16 = 0x0002;
    pub const TKIP: u16 = 0x0004;
    pub const AES: u16 = 0x0008;
    pub const AES_TKIP: u16 = TKIP | AES;
}

/// Connection Type Flags bits.
pub mod connection_type {
    pub const ESS: u8 = 0x01;
    pub const IBSS: u8 = 0x02;
}

/// Config Methods bits.
pub mod config_method {
    pub const LABEL: u16 = 0x0004;
    pub const DISPLAY: u16 = 0x0008;
    pub const PUSH_BUTTON: u16 = 0x0080;
    pub const KEYPAD: u16 = 0x0100;
    pub const VIRTUAL_PUSH_BUTTON: u16 = 0x0280;
    pub const PHYSICAL_PUSH_BUTTON: u16 = 0x0480;
    pub const VIRTUAL_DISPLAY_PIN: u16 = 0x2008;
    pub const PHYSICAL_DISPLAY_PIN: u16 = 0x4008;
}

/// RF Bands bits.
pub mod rf_band {
    pub const BAND_2_4_GHZ: u8 = 0x01;
    pub const BAND_5_0_GHZ: u8 = 0x02;
    pub const BAND_60_GHZ: u8 = 0x04;
}

/// Wi-Fi Simple Configuration State values.
pub mod simple_config_state {
    pub const NOT_CONFIGURED: u8 = 0x01;
    pub const CONFIGURED: u8 = 0x02;
}

/// Association State values.
pub mod association_state {
    pub const NOT_ASSOCIATED: u16 = 0x0000;
    pub const CONNECTION_SUCCESS: u16 = 0x0001;
    pub const CONFIGURATION_FAILURE: u16 = 0x0002;
    pub const ASSOCIATION_FAILURE: u16 = 0x0003;
    pub const IP_FAILURE: u16 = 0x0004;
}

/// Device Password ID values.
pub mod device_password_id {
    pub const DEFAULT: u16 = 0x0000;
    pub const USER_SPECIFIED: u16 = 0x0001;
    pub const MACHINE_SPECIFIED: u16 = 0x0002;
    pub const REKEY: u16 = 0x0003;
    pub const PUSH_BUTTON: u16 = 0x0004;
    pub const REGISTRAR_SPECIFIED: u16 = 0x0005;
}

/// Configuration Error attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationError(pub u16);

impl ConfigurationError {
    pub const NO_ERROR: Self = Self(0x0000);
    pub const DECRYPTION_CRC_FAILURE: Self = Self(0x0011);
    pub const DEVICE_PASSWORD_AUTH_FAILURE: Self = Self(0x0012);
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NO_ERROR => write!(f, "no error"),
            Self::DECRYPTION_CRC_FAILURE => write!(f, "decryption CRC failure"),
            Self::DEVICE_PASSWORD_AUTH_FAILURE => {
                write!(f, "device password authentication failure")
            }
            Self(code) => write!(f, "configuration error 0x{code:02x}"),
        }
    }
}

/// Primary Device Type attribute: category, OUI, OUI type, subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryDeviceType {
    pub category: u16,
    pub oui: [u8; 3],
    pub oui_type: u8,
    pub subcategory: u16,
}

impl PrimaryDeviceType {
    /// WFA standard PC (Computer / PC).
    pub fn wfa_pc() -> Self {
        Self {
            category: 1,
            oui: WFA_OUI,
            oui_type: 0x04,
            subcategory: 1,
        }
    }

    /// Wire form: category, OUI + OUI type, subcategory, all big-endian.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..2].copy_from_slice(&self.category.to_be_bytes());
        out[2..5].copy_from_slice(&self.oui);
        out[5] = self.oui_type;
        out[6..].copy_from_slice(&self.subcategory.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; 8] = bytes.try_into().ok()?;
        Some(Self {
            category: u16::from_be_bytes([bytes[0], bytes[1]]),
            oui: [bytes[2], bytes[3], bytes[4]],
            oui_type: bytes[5],
            subcategory: u16::from_be_bytes([bytes[6], bytes[7]]),
        })
    }
}

impl FromStr for PrimaryDeviceType {
    type Err = ConfigError;

    /// Parse the `category-OUIoui_type-subcategory` configuration form,
    /// e.g. `1-0050F204-1` (all fields hexadecimal).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPrimaryDeviceType(s.to_string());

        let mut parts = s.split('-');
        let category = parts.next().ok_or_else(invalid)?;
        let oui_block = parts.next().ok_or_else(invalid)?;
        let subcategory = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() || oui_block.len() != 8 {
            return Err(invalid());
        }

        let category = u16::from_str_radix(category, 16).map_err(|_| invalid())?;
        let subcategory = u16::from_str_radix(subcategory, 16).map_err(|_| invalid())?;

        let mut oui_bytes = [0u8; 4];
        for (i, chunk) in oui_bytes.iter_mut().enumerate() {
            *chunk = u8::from_str_radix(&oui_block[i * 2..i * 2 + 2], 16)
                .map_err(|_| invalid())?;
        }

        Ok(Self {
            category,
            oui: [oui_bytes[0], oui_bytes[1], oui_bytes[2]],
            oui_type: oui_bytes[3],
            subcategory,
        })
    }
}

impl fmt::Display for PrimaryDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x}-{:02X}{:02X}{:02X}{:02X}-{:x}",
            self.category,
            self.oui[0],
            self.oui[1],
            self.oui[2],
            self.oui_type,
            self.subcategory
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod primary_device_type {
        use super::*;

        #[test]
        fn parses_wfa_pc_form() {
            let pdt: PrimaryDeviceType = "1-0050F204-1".parse().unwrap();
            assert_eq!(pdt.category, 1);
            assert_eq!(pdt.oui, [0x00, 0x50, 0xf2]);
            assert_eq!(pdt.oui_type, 0x04);
            assert_eq!(pdt.subcategory, 1);
        }

        #[test]
        fn wire_roundtrip() {
            let pdt = PrimaryDeviceType::wfa_pc();
            assert_eq!(PrimaryDeviceType::from_bytes(&pdt.to_bytes()), Some(pdt));
        }

        #[test]
        fn wire_form_is_big_endian() {
            let pdt = PrimaryDeviceType {
                category: 0x0102,
                oui: [0xaa, 0xbb, 0xcc],
                oui_type: 0xdd,
                subcategory: 0x0304,
            };
            assert_eq!(
                pdt.to_bytes(),
                [0x01, 0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0x03, 0x04]
            );
        }

        #[test]
        fn display_roundtrip() {
            let pdt: PrimaryDeviceType = "1-0050F204-1".parse().unwrap();
            let again: PrimaryDeviceType = pdt.to_string().parse().unwrap();
            assert_eq!(pdt, again);
        }

        #[test]
        fn rejects_malformed_forms() {
            assert!("1-0050F204".parse::<PrimaryDeviceType>().is_err());
            assert!("1-0050F2-1".parse::<PrimaryDeviceType>().is_err());
            assert!("1-0050F204-1-9".parse::<PrimaryDeviceType>().is_err());
            assert!("x-0050F204-1".parse::<PrimaryDeviceType>().is_err());
        }

        #[test]
        fn from_bytes_rejects_wrong_width() {
            assert_eq!(PrimaryDeviceType::from_bytes(&[0u8; 7]), None);
        }
    }

    mod configuration_error {
        use super::*;

        #[test]
        fn display_names_known_codes() {
            assert_eq!(ConfigurationError::NO_ERROR.to_string(), "no error");
            assert!(ConfigurationError::DECRYPTION_CRC_FAILURE
                .to_string()
                .contains("CRC"));
            assert!(ConfigurationError::DEVICE_PASSWORD_AUTH_FAILURE
                .to_string()
                .contains("password"));
            assert!(ConfigurationError(0x33).to_string().contains("0x33"));
        }
    }
}
