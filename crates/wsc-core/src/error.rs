//! Error types for the WSC Enrollee workspace.

use thiserror::Error;

/// Primary error type for all WSC operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised while loading the `[WSC]` configuration table.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("{key}: value is not valid hex")]
    InvalidHex { key: &'static str },

    #[error("{key}: expected {expected} bytes, got {actual}")]
    WrongLength {
        key: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Device password must contain only hex digits")]
    PasswordNotHex,

    #[error("Device password must be at least 8 characters, got {0}")]
    PasswordTooShort(usize),

    #[error("Unsupported RF band value: {0}")]
    InvalidRfBand(u32),

    #[error("Invalid primary device type: {0}")]
    InvalidPrimaryDeviceType(String),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Cryptographic operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid peer public key")]
    InvalidPeerKey,

    #[error("Weak Diffie-Hellman shared secret")]
    WeakSharedSecret,

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Input must be a multiple of the AES block size")]
    BlockAlignment,

    #[error("Malformed encrypted settings payload")]
    MalformedSettings,

    #[error("Invalid padding")]
    InvalidPadding,
}

/// Wire-format parsing errors for WSC attributes and frames.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Truncated attribute header at offset {0}")]
    TruncatedHeader(usize),

    #[error("Attribute 0x{attribute:04x} claims {claimed} bytes, {available} available")]
    TruncatedValue {
        attribute: u16,
        claimed: usize,
        available: usize,
    },

    #[error("Missing required attribute 0x{0:04x}")]
    MissingAttribute(u16),

    #[error("Attribute 0x{attribute:04x} has length {actual}, expected {expected}")]
    InvalidAttributeLength {
        attribute: u16,
        expected: usize,
        actual: usize,
    },

    #[error("Unexpected message type 0x{0:02x}")]
    UnexpectedMessageType(u8),

    #[error("Unknown opcode 0x{0:02x}")]
    UnknownOp(u8),

    #[error("Frame too short")]
    FrameTooShort,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
