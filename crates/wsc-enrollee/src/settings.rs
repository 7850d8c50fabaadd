//! Resolution of the `[WSC]` configuration table into session material.
//!
//! Every optional secret (nonces, IVs, the Diffie-Hellman private key)
//! falls back to fresh random bytes, so a bare configuration with just
//! `EnrolleeMAC` and `RFBand` produces a working session while a fully
//! pinned one reproduces an exchange byte for byte.

use rand::rngs::OsRng;
use rand::RngCore;
use wsc_core::config::WscConfig;
use wsc_core::error::ConfigError;
use wsc_core::mac::MacAddress;
use wsc_crypto::dh::DhPrivateKey;
use wsc_crypto::keys::DevicePassword;
use wsc_proto::device::{
    association_state, auth_type, config_method, connection_type, device_password_id,
    encryption_type, rf_band, simple_config_state, PrimaryDeviceType,
};
use wsc_proto::msg::{
    M1, DEVICE_NAME_MAX, MANUFACTURER_MAX, MODEL_NAME_MAX, MODEL_NUMBER_MAX, SERIAL_NUMBER_MAX,
};
use wsc_proto::uuid::uuid_from_mac;
use zeroize::Zeroizing;

/// Fully resolved Enrollee identity and session secrets.
pub struct EnrolleeSettings {
    pub(crate) m1: M1,
    pub(crate) private_key: DhPrivateKey,
    pub(crate) device_password: DevicePassword,
    pub(crate) e_snonce1: Zeroizing<[u8; 16]>,
    pub(crate) e_snonce2: Zeroizing<[u8; 16]>,
    pub(crate) iv1: [u8; 16],
    pub(crate) iv2: [u8; 16],
}

impl EnrolleeSettings {
    /// Validate the configuration and assemble the M1 identity.
    pub fn from_config(config: &WscConfig) -> Result<Self, ConfigError> {
        let mac: MacAddress = config
            .enrollee_mac
            .as_deref()
            .ok_or(ConfigError::MissingKey("EnrolleeMAC"))?
            .parse()?;
        let addr = mac.to_bytes();

        let enrollee_nonce = hex_or_random("EnrolleeNonce", &config.enrollee_nonce)?;

        let private_key = match &config.private_key {
            Some(value) => {
                let bytes: Zeroizing<[u8; 192]> =
                    Zeroizing::new(decode_hex("PrivateKey", value)?);
                DhPrivateKey::from_bytes(*bytes)
            }
            None => DhPrivateKey::generate(),
        };
        let public_key = private_key.public_key();

        let primary_device_type = match &config.primary_device_type {
            Some(value) => value.parse()?,
            None => PrimaryDeviceType::wfa_pc(),
        };

        let rf_bands = match config.rf_band.ok_or(ConfigError::MissingKey("RFBand"))? {
            value
                if value == u32::from(rf_band::BAND_2_4_GHZ)
                    || value == u32::from(rf_band::BAND_5_0_GHZ)
                    || value == u32::from(rf_band::BAND_60_GHZ) =>
            {
                value as u8
            }
            other => return Err(ConfigError::InvalidRfBand(other)),
        };

        let device_password = match &config.device_password {
            Some(value) => DevicePassword::parse(value)?,
            None => DevicePassword::default_pin(),
        };

        let m1 = M1 {
            uuid_e: uuid_from_mac(&addr),
            addr,
            enrollee_nonce,
            public_key,
            auth_type_flags: auth_type::OPEN
                | auth_type::WPA_PERSONAL
                | auth_type::WPA2_PERSONAL,
            encryption_type_flags: encryption_type::NONE | encryption_type::AES_TKIP,
            connection_type_flags: connection_type::ESS,
            config_methods: config
                .configuration_methods
                .unwrap_or(config_method::VIRTUAL_DISPLAY_PIN),
            state: simple_config_state::NOT_CONFIGURED,
            manufacturer: constrained_string(&config.manufacturer, MANUFACTURER_MAX),
            model_name: constrained_string(&config.model_name, MODEL_NAME_MAX),
            model_number: constrained_string(&config.model_number, MODEL_NUMBER_MAX),
            serial_number: constrained_string(&config.serial_number, SERIAL_NUMBER_MAX),
            primary_device_type,
            device_name: constrained_string(&config.device_name, DEVICE_NAME_MAX),
            rf_bands,
            association_state: association_state::NOT_ASSOCIATED,
            device_password_id: device_password_id::PUSH_BUTTON,
            configuration_error: 0,
            os_version: config.os_version.unwrap_or(0) & 0x7fff_ffff,
        };

        Ok(Self {
            m1,
            private_key,
            device_password,
            e_snonce1: Zeroizing::new(hex_or_random("E-SNonce1", &config.e_snonce1)?),
            e_snonce2: Zeroizing::new(hex_or_random("E-SNonce2", &config.e_snonce2)?),
            iv1: hex_or_random("IV1", &config.iv1)?,
            iv2: hex_or_random("IV2", &config.iv2)?,
        })
    }
}

fn decode_hex<const N: usize>(key: &'static str, value: &str) -> Result<[u8; N], ConfigError> {
    let decoded = hex::decode(value).map_err(|_| ConfigError::InvalidHex { key })?;
    decoded
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::WrongLength {
            key,
            expected: N,
            actual: decoded.len(),
        })
}

fn hex_or_random<const N: usize>(
    key: &'static str,
    value: &Option<String>,
) -> Result<[u8; N], ConfigError> {
    match value {
        Some(value) => decode_hex(key, value),
        None => {
            let mut bytes = [0u8; N];
            OsRng.fill_bytes(&mut bytes);
            Ok(bytes)
        }
    }
}

/// Truncate a configured identity string to its container size; a single
/// space stands in for anything unset.
fn constrained_string(value: &Option<String>, max: usize) -> String {
    match value {
        Some(value) => {
            let mut out = value.clone();
            if let Some((idx, _)) = out.char_indices().nth(max) {
                out.truncate(idx);
            }
            out
        }
        None => " ".to_string(),
    }
}
