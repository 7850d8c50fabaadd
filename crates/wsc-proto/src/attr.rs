//! WSC TLV attribute codec.
//!
//! Attributes are encoded as a big-endian 16-bit type, a 16-bit length
//! and the value bytes (WSC 2.0.5, Section 12). Unknown attributes are
//! preserved by the reader so newer peers parse cleanly.

use wsc_core::error::ParseError;

pub const ASSOCIATION_STATE: u16 = 0x1002;
pub const AUTHENTICATION_TYPE: u16 = 0x1003;
pub const AUTHENTICATION_TYPE_FLAGS: u16 = 0x1004;
pub const AUTHENTICATOR: u16 = 0x1005;
pub const CONFIG_METHODS: u16 = 0x1008;
pub const CONFIGURATION_ERROR: u16 = 0x1009;
pub const CONNECTION_TYPE_FLAGS: u16 = 0x100d;
pub const CREDENTIAL: u16 = 0x100e;
pub const ENCRYPTION_TYPE: u16 = 0x100f;
pub const ENCRYPTION_TYPE_FLAGS: u16 = 0x1010;
pub const DEVICE_NAME: u16 = 0x1011;
pub const DEVICE_PASSWORD_ID: u16 = 0x1012;
pub const E_HASH1: u16 = 0x1014;
pub const E_HASH2: u16 = 0x1015;
pub const E_SNONCE1: u16 = 0x1016;
pub const E_SNONCE2: u16 = 0x1017;
pub const ENCRYPTED_SETTINGS: u16 = 0x1018;
pub const ENROLLEE_NONCE: u16 = 0x101a;
pub const KEY_WRAP_AUTHENTICATOR: u16 = 0x101e;
pub const MAC_ADDRESS: u16 = 0x1020;
pub const MANUFACTURER: u16 = 0x1021;
pub const MESSAGE_TYPE: u16 = 0x1022;
pub const MODEL_NAME: u16 = 0x1023;
pub const MODEL_NUMBER: u16 = 0x1024;
pub const NETWORK_INDEX: u16 = 0x1026;
pub const NETWORK_KEY: u16 = 0x1027;
pub const NETWORK_KEY_INDEX: u16 = 0x1028;
pub const OS_VERSION: u16 = 0x102d;
pub const PUBLIC_KEY: u16 = 0x1032;
pub const REGISTRAR_NONCE: u16 = 0x1039;
pub const RF_BANDS: u16 = 0x103c;
pub const R_HASH1: u16 = 0x103d;
pub const R_HASH2: u16 = 0x103e;
pub const R_SNONCE1: u16 = 0x103f;
pub const R_SNONCE2: u16 = 0x1040;
pub const SERIAL_NUMBER: u16 = 0x1042;
pub const SIMPLE_CONFIG_STATE: u16 = 0x1044;
pub const SSID: u16 = 0x1045;
pub const UUID_E: u16 = 0x1047;
pub const UUID_R: u16 = 0x1048;
pub const VENDOR_EXTENSION: u16 = 0x1049;
pub const VERSION: u16 = 0x104a;
pub const PRIMARY_DEVICE_TYPE: u16 = 0x1054;

/// Deprecated Version attribute value, always 0x10.
pub const VERSION_2_0: u8 = 0x10;

/// WFA Version2 vendor extension: OUI, then subelement id 0 with the
/// one-byte protocol version 0x20.
const VERSION2_EXTENSION: [u8; 6] = [0x00, 0x37, 0x2a, 0x00, 0x01, 0x20];

/// Serializer for a run of attributes.
#[derive(Default)]
pub struct AttrWriter {
    buf: Vec<u8>,
}

impl AttrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one attribute.
    pub fn put(&mut self, attribute: u16, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(&attribute.to_be_bytes());
        self.buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(value);
        self
    }

    pub fn put_u8(&mut self, attribute: u16, value: u8) -> &mut Self {
        self.put(attribute, &[value])
    }

    pub fn put_u16(&mut self, attribute: u16, value: u16) -> &mut Self {
        self.put(attribute, &value.to_be_bytes())
    }

    pub fn put_u32(&mut self, attribute: u16, value: u32) -> &mut Self {
        self.put(attribute, &value.to_be_bytes())
    }

    /// Append the WFA Version2 vendor extension.
    pub fn put_version2(&mut self) -> &mut Self {
        self.put(VENDOR_EXTENSION, &VERSION2_EXTENSION)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Parsed attribute run, in wire order. Duplicate types are kept.
pub struct Attrs<'a> {
    items: Vec<(u16, &'a [u8])>,
}

impl<'a> Attrs<'a> {
    /// Parse a contiguous run of attributes.
    pub fn parse(data: &'a [u8]) -> Result<Self, ParseError> {
        let mut items = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            if data.len() - pos < 4 {
                return Err(ParseError::TruncatedHeader(pos));
            }
            let attribute = u16::from_be_bytes([data[pos], data[pos + 1]]);
            let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            pos += 4;

            if data.len() - pos < len {
                return Err(ParseError::TruncatedValue {
                    attribute,
                    claimed: len,
                    available: data.len() - pos,
                });
            }
            items.push((attribute, &data[pos..pos + len]));
            pos += len;
        }

        Ok(Self { items })
    }

    /// First value of the given type.
    pub fn get(&self, attribute: u16) -> Option<&'a [u8]> {
        self.items
            .iter()
            .find(|(t, _)| *t == attribute)
            .map(|(_, v)| *v)
    }

    /// Every value of the given type, in wire order.
    pub fn get_all(&self, attribute: u16) -> Vec<&'a [u8]> {
        self.items
            .iter()
            .filter(|(t, _)| *t == attribute)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn contains(&self, attribute: u16) -> bool {
        self.get(attribute).is_some()
    }

    pub fn require(&self, attribute: u16) -> Result<&'a [u8], ParseError> {
        self.get(attribute)
            .ok_or(ParseError::MissingAttribute(attribute))
    }

    /// Required fixed-width value.
    pub fn require_array<const N: usize>(&self, attribute: u16) -> Result<[u8; N], ParseError> {
        let value = self.require(attribute)?;
        value
            .try_into()
            .map_err(|_| ParseError::InvalidAttributeLength {
                attribute,
                expected: N,
                actual: value.len(),
            })
    }

    pub fn require_u8(&self, attribute: u16) -> Result<u8, ParseError> {
        let value: [u8; 1] = self.require_array(attribute)?;
        Ok(value[0])
    }

    pub fn require_u16(&self, attribute: u16) -> Result<u16, ParseError> {
        Ok(u16::from_be_bytes(self.require_array(attribute)?))
    }

    pub fn get_u8(&self, attribute: u16) -> Option<u8> {
        self.get(attribute)
            .filter(|v| v.len() == 1)
            .map(|v| v[0])
    }

    pub fn get_u16(&self, attribute: u16) -> Option<u16> {
        self.get(attribute)
            .and_then(|v| <[u8; 2]>::try_from(v).ok())
            .map(u16::from_be_bytes)
    }

    pub fn get_u32(&self, attribute: u16) -> Option<u32> {
        self.get(attribute)
            .and_then(|v| <[u8; 4]>::try_from(v).ok())
            .map(u32::from_be_bytes)
    }

    /// String value, lossily decoded; empty when absent.
    pub fn string(&self, attribute: u16) -> String {
        self.get(attribute)
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn parse_empty() {
            let attrs = Attrs::parse(&[]).unwrap();
            assert!(!attrs.contains(MESSAGE_TYPE));
        }

        #[test]
        fn parse_single_attribute() {
            // MessageType = 0x04
            let data = [0x10, 0x22, 0x00, 0x01, 0x04];
            let attrs = Attrs::parse(&data).unwrap();
            assert_eq!(attrs.get_u8(MESSAGE_TYPE), Some(0x04));
        }

        #[test]
        fn parse_multiple_attributes() {
            let mut writer = AttrWriter::new();
            writer.put_u8(VERSION, VERSION_2_0);
            writer.put_u8(MESSAGE_TYPE, 0x04);
            writer.put(ENROLLEE_NONCE, &[0xAA; 16]);
            let data = writer.into_bytes();

            let attrs = Attrs::parse(&data).unwrap();
            assert_eq!(attrs.get_u8(VERSION), Some(0x10));
            assert_eq!(attrs.get(ENROLLEE_NONCE), Some([0xAA; 16].as_slice()));
        }

        #[test]
        fn parse_zero_length_value() {
            let data = [0x10, 0x22, 0x00, 0x00];
            let attrs = Attrs::parse(&data).unwrap();
            assert_eq!(attrs.get(MESSAGE_TYPE), Some([].as_slice()));
        }

        #[test]
        fn parse_error_on_truncated_header() {
            assert!(matches!(
                Attrs::parse(&[0x10, 0x22, 0x00]),
                Err(ParseError::TruncatedHeader(0))
            ));
        }

        #[test]
        fn parse_error_on_truncated_value() {
            let data = [0x10, 0x22, 0x00, 0x05, 0x01, 0x02];
            assert!(matches!(
                Attrs::parse(&data),
                Err(ParseError::TruncatedValue { .. })
            ));
        }

        #[test]
        fn duplicates_are_kept_in_order() {
            let mut writer = AttrWriter::new();
            writer.put(CREDENTIAL, &[0x01]);
            writer.put(CREDENTIAL, &[0x02]);
            let data = writer.into_bytes();

            let attrs = Attrs::parse(&data).unwrap();
            let all = attrs.get_all(CREDENTIAL);
            assert_eq!(all.len(), 2);
            assert_eq!(all[0], &[0x01]);
            assert_eq!(all[1], &[0x02]);
        }
    }

    mod accessors {
        use super::*;

        #[test]
        fn require_missing_attribute() {
            let attrs = Attrs::parse(&[]).unwrap();
            assert!(matches!(
                attrs.require(PUBLIC_KEY),
                Err(ParseError::MissingAttribute(PUBLIC_KEY))
            ));
        }

        #[test]
        fn require_array_rejects_wrong_width() {
            let mut writer = AttrWriter::new();
            writer.put(ENROLLEE_NONCE, &[0xAA; 15]);
            let data = writer.into_bytes();

            let attrs = Attrs::parse(&data).unwrap();
            let result: Result<[u8; 16], _> = attrs.require_array(ENROLLEE_NONCE);
            assert!(matches!(
                result,
                Err(ParseError::InvalidAttributeLength {
                    expected: 16,
                    actual: 15,
                    ..
                })
            ));
        }

        #[test]
        fn integer_accessors_check_width() {
            let mut writer = AttrWriter::new();
            writer.put_u16(CONFIG_METHODS, 0x2008);
            let data = writer.into_bytes();

            let attrs = Attrs::parse(&data).unwrap();
            assert_eq!(attrs.get_u16(CONFIG_METHODS), Some(0x2008));
            assert_eq!(attrs.get_u8(CONFIG_METHODS), None);
            assert_eq!(attrs.get_u32(CONFIG_METHODS), None);
        }

        #[test]
        fn string_accessor_defaults_to_empty() {
            let mut writer = AttrWriter::new();
            writer.put(MANUFACTURER, b"Acme");
            let data = writer.into_bytes();

            let attrs = Attrs::parse(&data).unwrap();
            assert_eq!(attrs.string(MANUFACTURER), "Acme");
            assert_eq!(attrs.string(MODEL_NAME), "");
        }
    }

    mod writer {
        use super::*;

        #[test]
        fn encodes_big_endian_header() {
            let mut writer = AttrWriter::new();
            writer.put(PUBLIC_KEY, &[0xCC; 3]);
            assert_eq!(
                writer.into_bytes(),
                vec![0x10, 0x32, 0x00, 0x03, 0xCC, 0xCC, 0xCC]
            );
        }

        #[test]
        fn version2_extension_bytes() {
            let mut writer = AttrWriter::new();
            writer.put_version2();
            assert_eq!(
                writer.into_bytes(),
                vec![0x10, 0x49, 0x00, 0x06, 0x00, 0x37, 0x2a, 0x00, 0x01, 0x20]
            );
        }

        #[test]
        fn roundtrip_through_reader() {
            let mut writer = AttrWriter::new();
            writer.put_u8(VERSION, VERSION_2_0);
            writer.put_u32(OS_VERSION, 0x8000_002a);
            writer.put(UUID_E, &[0x11; 16]);
            let data = writer.into_bytes();

            let attrs = Attrs::parse(&data).unwrap();
            assert_eq!(attrs.get_u8(VERSION), Some(0x10));
            assert_eq!(attrs.get_u32(OS_VERSION), Some(0x8000_002a));
            assert_eq!(attrs.require_array::<16>(UUID_E).unwrap(), [0x11; 16]);
        }
    }
}
