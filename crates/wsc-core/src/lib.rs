//! # wsc-core
//!
//! Shared foundation for the WSC Enrollee workspace:
//! - error taxonomy for configuration, crypto, parsing and session faults
//! - MAC address type used by the configuration and the wire codec
//! - the `[WSC]` configuration table model

pub mod config;
pub mod error;
pub mod mac;

pub use config::WscConfig;
pub use error::{Error, Result};
pub use mac::MacAddress;
