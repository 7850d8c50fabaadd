//! `[WSC]` configuration table model.
//!
//! The raw table keeps every option optional; resolution into session
//! material (random defaults, validation, M1 assembly) happens in the
//! enrollee crate so that a missing optional key can be backed by fresh
//! random bytes at session setup time.

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "WSC")]
    wsc: WscConfig,
}

/// Raw `[WSC]` options as they appear in the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WscConfig {
    #[serde(rename = "EnrolleeMAC")]
    pub enrollee_mac: Option<String>,

    /// Hex-encoded 16-byte nonce; random when absent.
    #[serde(rename = "EnrolleeNonce")]
    pub enrollee_nonce: Option<String>,

    /// Hex-encoded 192-byte Diffie-Hellman private key; random when absent.
    #[serde(rename = "PrivateKey")]
    pub private_key: Option<String>,

    #[serde(rename = "ConfigurationMethods")]
    pub configuration_methods: Option<u16>,

    #[serde(rename = "Manufacturer")]
    pub manufacturer: Option<String>,

    #[serde(rename = "ModelName")]
    pub model_name: Option<String>,

    #[serde(rename = "ModelNumber")]
    pub model_number: Option<String>,

    #[serde(rename = "SerialNumber")]
    pub serial_number: Option<String>,

    #[serde(rename = "DeviceName")]
    pub device_name: Option<String>,

    /// `category-OUIoui_type-subcategory`, e.g. `1-0050F204-1`.
    #[serde(rename = "PrimaryDeviceType")]
    pub primary_device_type: Option<String>,

    #[serde(rename = "RFBand")]
    pub rf_band: Option<u32>,

    #[serde(rename = "OSVersion")]
    pub os_version: Option<u32>,

    #[serde(rename = "DevicePassword")]
    pub device_password: Option<String>,

    #[serde(rename = "E-SNonce1")]
    pub e_snonce1: Option<String>,

    #[serde(rename = "E-SNonce2")]
    pub e_snonce2: Option<String>,

    #[serde(rename = "IV1")]
    pub iv1: Option<String>,

    #[serde(rename = "IV2")]
    pub iv2: Option<String>,
}

impl WscConfig {
    /// Parse the `[WSC]` table out of a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.wsc)
    }
}
