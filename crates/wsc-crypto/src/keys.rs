//! Zeroize-on-drop wrappers for WSC session key material.

use subtle::ConstantTimeEq;
use wsc_core::error::ConfigError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::digest::hmac_sha256;

/// 32-byte HMAC key authenticating every registration message after M1.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthKey([u8; 32]);

impl AuthKey {
    /// Create from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// HMAC-SHA-256 over the concatenation of `parts`.
    pub fn hmac(&self, parts: &[&[u8]]) -> [u8; 32] {
        hmac_sha256(&self.0, parts)
    }

    /// Verify an 8-byte trailing tag against the digest prefix, in
    /// constant time.
    pub fn verify_tag8(&self, parts: &[&[u8]], tag: &[u8]) -> bool {
        let digest = self.hmac(parts);
        digest[..8].ct_eq(tag).into()
    }

    /// Verify a full 32-byte commitment hash in constant time.
    pub fn verify_hash32(&self, parts: &[&[u8]], expected: &[u8; 32]) -> bool {
        let digest = self.hmac(parts);
        digest.ct_eq(expected).into()
    }
}

/// 16-byte AES key protecting Encrypted Settings payloads.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyWrapKey([u8; 16]);

impl KeyWrapKey {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Extended Master Session Key handed to the outer EAP layer.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Emsk([u8; 32]);

impl Emsk {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// 64-byte Master Session Key expanded from the EMSK.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Msk([u8; 64]);

impl Msk {
    pub fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// 16-byte key derived from one half of the device password.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Psk([u8; 16]);

impl Psk {
    /// Truncate an HMAC digest to the PSK width.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// AuthKey ‖ KeyWrapKey ‖ EMSK as expanded from the KDK.
///
/// The struct itself carries no Drop glue so that it can be taken apart
/// by move; each field zeroizes itself when dropped.
pub struct SessionKeys {
    pub auth_key: AuthKey,
    pub keywrap_key: KeyWrapKey,
    pub emsk: Emsk,
}

impl SessionKeys {
    /// Partition the 80-byte KDF output.
    pub fn from_keyblock(block: &[u8; 80]) -> Self {
        let mut auth_key = [0u8; 32];
        let mut keywrap_key = [0u8; 16];
        let mut emsk = [0u8; 32];
        auth_key.copy_from_slice(&block[..32]);
        keywrap_key.copy_from_slice(&block[32..48]);
        emsk.copy_from_slice(&block[48..]);
        Self {
            auth_key: AuthKey::new(auth_key),
            keywrap_key: KeyWrapKey::new(keywrap_key),
            emsk: Emsk::new(emsk),
        }
    }
}

/// ASCII-hex device password, stored uppercase.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DevicePassword(String);

impl DevicePassword {
    /// Validate and normalize a configured password.
    ///
    /// WSC 2.0.5, Section 7.4: out-of-band device passwords are
    /// expressed in hexadecimal using ASCII characters, uppercase
    /// letters only. Lowercase input is accepted and mapped up.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) || value.is_empty() {
            return Err(ConfigError::PasswordNotHex);
        }
        if value.len() < 8 {
            return Err(ConfigError::PasswordTooShort(value.len()));
        }
        Ok(Self(value.to_ascii_uppercase()))
    }

    /// The all-zero PIN used when no password is configured.
    pub fn default_pin() -> Self {
        Self("00000000".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
