//! UUID-E derivation from the Enrollee MAC address.

use uuid::Uuid;

/// Namespace id shared with other supplicant implementations so that the
/// same MAC always maps to the same UUID-E across stacks.
const WSC_UUID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x52, 0x64, 0x80, 0xf8, 0xc9, 0x9b, 0x4b, 0xe5, 0xa6, 0x55, 0x58, 0xed, 0x5f, 0x5d, 0x60,
    0x84,
]);

/// Derive the 16-byte UUID-E (version 5, SHA-1 based) from a MAC address.
pub fn uuid_from_mac(mac: &[u8; 6]) -> [u8; 16] {
    *Uuid::new_v5(&WSC_UUID_NAMESPACE, mac).as_bytes()
}
