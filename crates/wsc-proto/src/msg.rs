//! Registration protocol messages.
//!
//! Builders emit the attribute run of each message *without* the trailing
//! Authenticator attribute; the session layer appends it because the
//! digest chains over the previously sent message. Parsing goes through
//! the tagged [`Message`] enum keyed on the Message Type attribute.

use wsc_core::error::ParseError;

use crate::attr::{self, AttrWriter, Attrs};
use crate::device::{ConfigurationError, PrimaryDeviceType};

pub const MSG_TYPE_M1: u8 = 0x04;
pub const MSG_TYPE_M2: u8 = 0x05;
pub const MSG_TYPE_M3: u8 = 0x07;
pub const MSG_TYPE_M4: u8 = 0x08;
pub const MSG_TYPE_M5: u8 = 0x09;
pub const MSG_TYPE_M6: u8 = 0x0a;
pub const MSG_TYPE_M7: u8 = 0x0b;
pub const MSG_TYPE_M8: u8 = 0x0c;
pub const MSG_TYPE_NACK: u8 = 0x0e;
pub const MSG_TYPE_DONE: u8 = 0x0f;

/// Container limits for the identity strings carried in M1.
pub const MANUFACTURER_MAX: usize = 64;
pub const MODEL_NAME_MAX: usize = 32;
pub const MODEL_NUMBER_MAX: usize = 32;
pub const SERIAL_NUMBER_MAX: usize = 32;
pub const DEVICE_NAME_MAX: usize = 32;

fn header(writer: &mut AttrWriter, msg_type: u8) {
    writer.put_u8(attr::VERSION, attr::VERSION_2_0);
    writer.put_u8(attr::MESSAGE_TYPE, msg_type);
}

/// M1: the Enrollee's identity, capabilities and public key.
#[derive(Debug, Clone)]
pub struct M1 {
    pub uuid_e: [u8; 16],
    pub addr: [u8; 6],
    pub enrollee_nonce: [u8; 16],
    pub public_key: [u8; 192],
    pub auth_type_flags: u16,
    pub encryption_type_flags: u16,
    pub connection_type_flags: u8,
    pub config_methods: u16,
    pub state: u8,
    pub manufacturer: String,
    pub model_name: String,
    pub model_number: String,
    pub serial_number: String,
    pub primary_device_type: PrimaryDeviceType,
    pub device_name: String,
    pub rf_bands: u8,
    pub association_state: u16,
    pub device_password_id: u16,
    pub configuration_error: u16,
    pub os_version: u32,
}

impl M1 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M1);
        writer.put(attr::UUID_E, &self.uuid_e);
        writer.put(attr::MAC_ADDRESS, &self.addr);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::PUBLIC_KEY, &self.public_key);
        writer.put_u16(attr::AUTHENTICATION_TYPE_FLAGS, self.auth_type_flags);
        writer.put_u16(attr::ENCRYPTION_TYPE_FLAGS, self.encryption_type_flags);
        writer.put_u8(attr::CONNECTION_TYPE_FLAGS, self.connection_type_flags);
        writer.put_u16(attr::CONFIG_METHODS, self.config_methods);
        writer.put_u8(attr::SIMPLE_CONFIG_STATE, self.state);
        writer.put(attr::MANUFACTURER, self.manufacturer.as_bytes());
        writer.put(attr::MODEL_NAME, self.model_name.as_bytes());
        writer.put(attr::MODEL_NUMBER, self.model_number.as_bytes());
        writer.put(attr::SERIAL_NUMBER, self.serial_number.as_bytes());
        writer.put(
            attr::PRIMARY_DEVICE_TYPE,
            &self.primary_device_type.to_bytes(),
        );
        writer.put(attr::DEVICE_NAME, self.device_name.as_bytes());
        writer.put_u8(attr::RF_BANDS, self.rf_bands);
        writer.put_u16(attr::ASSOCIATION_STATE, self.association_state);
        writer.put_u16(attr::DEVICE_PASSWORD_ID, self.device_password_id);
        writer.put_u16(attr::CONFIGURATION_ERROR, self.configuration_error);
        // The wire form of OS Version always carries the top bit
        writer.put_u32(attr::OS_VERSION, self.os_version | 0x8000_0000);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            uuid_e: attrs.require_array(attr::UUID_E)?,
            addr: attrs.require_array(attr::MAC_ADDRESS)?,
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            public_key: attrs.require_array(attr::PUBLIC_KEY)?,
            auth_type_flags: attrs.get_u16(attr::AUTHENTICATION_TYPE_FLAGS).unwrap_or(0),
            encryption_type_flags: attrs.get_u16(attr::ENCRYPTION_TYPE_FLAGS).unwrap_or(0),
            connection_type_flags: attrs.get_u8(attr::CONNECTION_TYPE_FLAGS).unwrap_or(0),
            config_methods: attrs.get_u16(attr::CONFIG_METHODS).unwrap_or(0),
            state: attrs.get_u8(attr::SIMPLE_CONFIG_STATE).unwrap_or(0),
            manufacturer: attrs.string(attr::MANUFACTURER),
            model_name: attrs.string(attr::MODEL_NAME),
            model_number: attrs.string(attr::MODEL_NUMBER),
            serial_number: attrs.string(attr::SERIAL_NUMBER),
            primary_device_type: attrs
                .get(attr::PRIMARY_DEVICE_TYPE)
                .and_then(PrimaryDeviceType::from_bytes)
                .unwrap_or_else(PrimaryDeviceType::wfa_pc),
            device_name: attrs.string(attr::DEVICE_NAME),
            rf_bands: attrs.get_u8(attr::RF_BANDS).unwrap_or(0),
            association_state: attrs.get_u16(attr::ASSOCIATION_STATE).unwrap_or(0),
            device_password_id: attrs.get_u16(attr::DEVICE_PASSWORD_ID).unwrap_or(0),
            configuration_error: attrs.get_u16(attr::CONFIGURATION_ERROR).unwrap_or(0),
            os_version: attrs.get_u32(attr::OS_VERSION).unwrap_or(0) & 0x7fff_ffff,
        })
    }
}

/// M2: the Registrar's nonce and public key.
#[derive(Debug, Clone)]
pub struct M2 {
    pub enrollee_nonce: [u8; 16],
    pub registrar_nonce: [u8; 16],
    pub uuid_r: [u8; 16],
    pub public_key: [u8; 192],
}

impl M2 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M2);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::REGISTRAR_NONCE, &self.registrar_nonce);
        writer.put(attr::UUID_R, &self.uuid_r);
        writer.put(attr::PUBLIC_KEY, &self.public_key);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            registrar_nonce: attrs.require_array(attr::REGISTRAR_NONCE)?,
            uuid_r: attrs.require_array(attr::UUID_R)?,
            public_key: attrs.require_array(attr::PUBLIC_KEY)?,
        })
    }
}

/// M3: the Enrollee's commitments to the device password halves.
#[derive(Debug, Clone)]
pub struct M3 {
    pub registrar_nonce: [u8; 16],
    pub e_hash1: [u8; 32],
    pub e_hash2: [u8; 32],
}

impl M3 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M3);
        writer.put(attr::REGISTRAR_NONCE, &self.registrar_nonce);
        writer.put(attr::E_HASH1, &self.e_hash1);
        writer.put(attr::E_HASH2, &self.e_hash2);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            registrar_nonce: attrs.require_array(attr::REGISTRAR_NONCE)?,
            e_hash1: attrs.require_array(attr::E_HASH1)?,
            e_hash2: attrs.require_array(attr::E_HASH2)?,
        })
    }
}

/// M4: the Registrar's commitments plus its first secret nonce.
#[derive(Debug, Clone)]
pub struct M4 {
    pub enrollee_nonce: [u8; 16],
    pub r_hash1: [u8; 32],
    pub r_hash2: [u8; 32],
    pub encrypted_settings: Vec<u8>,
}

impl M4 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M4);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::R_HASH1, &self.r_hash1);
        writer.put(attr::R_HASH2, &self.r_hash2);
        writer.put(attr::ENCRYPTED_SETTINGS, &self.encrypted_settings);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            r_hash1: attrs.require_array(attr::R_HASH1)?,
            r_hash2: attrs.require_array(attr::R_HASH2)?,
            encrypted_settings: attrs.require(attr::ENCRYPTED_SETTINGS)?.to_vec(),
        })
    }
}

/// M5: the Enrollee's first secret nonce, encrypted.
#[derive(Debug, Clone)]
pub struct M5 {
    pub registrar_nonce: [u8; 16],
    pub encrypted_settings: Vec<u8>,
}

impl M5 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M5);
        writer.put(attr::REGISTRAR_NONCE, &self.registrar_nonce);
        writer.put(attr::ENCRYPTED_SETTINGS, &self.encrypted_settings);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            registrar_nonce: attrs.require_array(attr::REGISTRAR_NONCE)?,
            encrypted_settings: attrs.require(attr::ENCRYPTED_SETTINGS)?.to_vec(),
        })
    }
}

/// M6: the Registrar's second secret nonce, encrypted.
#[derive(Debug, Clone)]
pub struct M6 {
    pub enrollee_nonce: [u8; 16],
    pub encrypted_settings: Vec<u8>,
}

impl M6 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M6);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::ENCRYPTED_SETTINGS, &self.encrypted_settings);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            encrypted_settings: attrs.require(attr::ENCRYPTED_SETTINGS)?.to_vec(),
        })
    }
}

/// M7: the Enrollee's second secret nonce, encrypted.
#[derive(Debug, Clone)]
pub struct M7 {
    pub registrar_nonce: [u8; 16],
    pub encrypted_settings: Vec<u8>,
}

impl M7 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M7);
        writer.put(attr::REGISTRAR_NONCE, &self.registrar_nonce);
        writer.put(attr::ENCRYPTED_SETTINGS, &self.encrypted_settings);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            registrar_nonce: attrs.require_array(attr::REGISTRAR_NONCE)?,
            encrypted_settings: attrs.require(attr::ENCRYPTED_SETTINGS)?.to_vec(),
        })
    }
}

/// M8: the provisioned credentials, encrypted.
#[derive(Debug, Clone)]
pub struct M8 {
    pub enrollee_nonce: [u8; 16],
    pub encrypted_settings: Vec<u8>,
}

impl M8 {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_M8);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::ENCRYPTED_SETTINGS, &self.encrypted_settings);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            encrypted_settings: attrs.require(attr::ENCRYPTED_SETTINGS)?.to_vec(),
        })
    }
}

/// WSC_NACK with its diagnostic code.
#[derive(Debug, Clone)]
pub struct Nack {
    pub enrollee_nonce: [u8; 16],
    pub registrar_nonce: [u8; 16],
    pub configuration_error: ConfigurationError,
}

impl Nack {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_NACK);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::REGISTRAR_NONCE, &self.registrar_nonce);
        writer.put_u16(attr::CONFIGURATION_ERROR, self.configuration_error.0);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            registrar_nonce: attrs.require_array(attr::REGISTRAR_NONCE)?,
            configuration_error: ConfigurationError(
                attrs.require_u16(attr::CONFIGURATION_ERROR)?,
            ),
        })
    }
}

/// WSC_DONE.
#[derive(Debug, Clone)]
pub struct Done {
    pub enrollee_nonce: [u8; 16],
    pub registrar_nonce: [u8; 16],
}

impl Done {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        header(&mut writer, MSG_TYPE_DONE);
        writer.put(attr::ENROLLEE_NONCE, &self.enrollee_nonce);
        writer.put(attr::REGISTRAR_NONCE, &self.registrar_nonce);
        writer.put_version2();
        writer.into_bytes()
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ParseError> {
        Ok(Self {
            enrollee_nonce: attrs.require_array(attr::ENROLLEE_NONCE)?,
            registrar_nonce: attrs.require_array(attr::REGISTRAR_NONCE)?,
        })
    }
}

/// A parsed registration protocol message.
#[derive(Debug, Clone)]
pub enum Message {
    M1(M1),
    M2(M2),
    M3(M3),
    M4(M4),
    M5(M5),
    M6(M6),
    M7(M7),
    M8(M8),
    Nack(Nack),
    Done(Done),
}

impl Message {
    /// Parse one message body, dispatching on the Message Type attribute.
    pub fn parse(body: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(body)?;
        let msg_type = attrs.require_u8(attr::MESSAGE_TYPE)?;

        match msg_type {
            MSG_TYPE_M1 => Ok(Self::M1(M1::from_attrs(&attrs)?)),
            MSG_TYPE_M2 => Ok(Self::M2(M2::from_attrs(&attrs)?)),
            MSG_TYPE_M3 => Ok(Self::M3(M3::from_attrs(&attrs)?)),
            MSG_TYPE_M4 => Ok(Self::M4(M4::from_attrs(&attrs)?)),
            MSG_TYPE_M5 => Ok(Self::M5(M5::from_attrs(&attrs)?)),
            MSG_TYPE_M6 => Ok(Self::M6(M6::from_attrs(&attrs)?)),
            MSG_TYPE_M7 => Ok(Self::M7(M7::from_attrs(&attrs)?)),
            MSG_TYPE_M8 => Ok(Self::M8(M8::from_attrs(&attrs)?)),
            MSG_TYPE_NACK => Ok(Self::Nack(Nack::from_attrs(&attrs)?)),
            MSG_TYPE_DONE => Ok(Self::Done(Done::from_attrs(&attrs)?)),
            other => Err(ParseError::UnexpectedMessageType(other)),
        }
    }
}

/// Inner Encrypted Settings payload of M4.
#[derive(Debug, Clone)]
pub struct M4EncryptedSettings {
    pub r_snonce1: [u8; 16],
}

impl M4EncryptedSettings {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        writer.put(attr::R_SNONCE1, &self.r_snonce1);
        writer.into_bytes()
    }

    pub fn parse(plaintext: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(plaintext)?;
        Ok(Self {
            r_snonce1: attrs.require_array(attr::R_SNONCE1)?,
        })
    }
}

/// Inner Encrypted Settings payload of M5.
#[derive(Debug, Clone)]
pub struct M5EncryptedSettings {
    pub e_snonce1: [u8; 16],
}

impl M5EncryptedSettings {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        writer.put(attr::E_SNONCE1, &self.e_snonce1);
        writer.into_bytes()
    }

    pub fn parse(plaintext: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(plaintext)?;
        Ok(Self {
            e_snonce1: attrs.require_array(attr::E_SNONCE1)?,
        })
    }
}

/// Inner Encrypted Settings payload of M6.
#[derive(Debug, Clone)]
pub struct M6EncryptedSettings {
    pub r_snonce2: [u8; 16],
}

impl M6EncryptedSettings {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        writer.put(attr::R_SNONCE2, &self.r_snonce2);
        writer.into_bytes()
    }

    pub fn parse(plaintext: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(plaintext)?;
        Ok(Self {
            r_snonce2: attrs.require_array(attr::R_SNONCE2)?,
        })
    }
}

/// Inner Encrypted Settings payload of M7.
#[derive(Debug, Clone)]
pub struct M7EncryptedSettings {
    pub e_snonce2: [u8; 16],
}

impl M7EncryptedSettings {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        writer.put(attr::E_SNONCE2, &self.e_snonce2);
        writer.into_bytes()
    }

    pub fn parse(plaintext: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(plaintext)?;
        Ok(Self {
            e_snonce2: attrs.require_array(attr::E_SNONCE2)?,
        })
    }
}

/// Maximum Credential attributes consumed from a single M8.
pub const MAX_CREDENTIALS: usize = 3;

/// Inner Encrypted Settings payload of M8.
#[derive(Debug, Clone)]
pub struct M8EncryptedSettings {
    pub credentials: Vec<Credential>,
}

impl M8EncryptedSettings {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        for credential in &self.credentials {
            writer.put(attr::CREDENTIAL, &credential.build());
        }
        writer.into_bytes()
    }

    /// Parse the provisioned credentials; at least one must be present.
    /// Anything beyond [`MAX_CREDENTIALS`] is ignored.
    pub fn parse(plaintext: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(plaintext)?;
        let mut credentials = Vec::new();

        for raw in attrs.get_all(attr::CREDENTIAL) {
            if credentials.len() == MAX_CREDENTIALS {
                break;
            }
            credentials.push(Credential::parse(raw)?);
        }

        if credentials.is_empty() {
            return Err(ParseError::MissingAttribute(attr::CREDENTIAL));
        }
        Ok(Self { credentials })
    }
}

/// One provisioned network credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub network_index: u8,
    pub ssid: Vec<u8>,
    pub auth_type: u16,
    pub encryption_type: u16,
    pub network_key_index: Option<u8>,
    pub network_key: Vec<u8>,
    pub addr: [u8; 6],
}

impl Credential {
    pub fn build(&self) -> Vec<u8> {
        let mut writer = AttrWriter::new();
        writer.put_u8(attr::NETWORK_INDEX, self.network_index);
        writer.put(attr::SSID, &self.ssid);
        writer.put_u16(attr::AUTHENTICATION_TYPE, self.auth_type);
        writer.put_u16(attr::ENCRYPTION_TYPE, self.encryption_type);
        if let Some(index) = self.network_key_index {
            writer.put_u8(attr::NETWORK_KEY_INDEX, index);
        }
        writer.put(attr::NETWORK_KEY, &self.network_key);
        writer.put(attr::MAC_ADDRESS, &self.addr);
        writer.into_bytes()
    }

    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let attrs = Attrs::parse(data)?;
        Ok(Self {
            network_index: attrs.get_u8(attr::NETWORK_INDEX).unwrap_or(1),
            ssid: attrs.require(attr::SSID)?.to_vec(),
            auth_type: attrs.require_u16(attr::AUTHENTICATION_TYPE)?,
            encryption_type: attrs.require_u16(attr::ENCRYPTION_TYPE)?,
            network_key_index: attrs.get_u8(attr::NETWORK_KEY_INDEX),
            network_key: attrs
                .get(attr::NETWORK_KEY)
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
            addr: attrs.require_array(attr::MAC_ADDRESS)?,
        })
    }
}
