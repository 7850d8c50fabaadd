//! # wsc-crypto
//!
//! Cryptographic primitives for the WSC Enrollee.
//!
//! This crate provides:
//! - Diffie-Hellman group 5 (RFC 3526, 1536-bit MODP) key agreement
//! - the WSC counter-mode KDF over HMAC-SHA-256
//! - AES-128-CBC for Encrypted Settings payloads
//! - zeroize-on-drop wrappers for all session key material
//!
//! All secret material is zeroized on drop.

pub mod aes;
pub mod dh;
pub mod digest;
pub mod kdf;
pub mod keys;

pub use self::aes::AesCbc128;
pub use self::dh::DhPrivateKey;
pub use self::keys::{AuthKey, DevicePassword, Emsk, KeyWrapKey, Msk, Psk, SessionKeys};
