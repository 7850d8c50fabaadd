//! WSC key schedule.
//!
//! WSC 2.0.5, Section 7.3: the Diffie-Hellman secret is hashed into
//! DHKey, DHKey keys the KDK over both nonces and the Enrollee MAC, and
//! the KDK is expanded by a counter-mode KDF into
//! AuthKey (32) ‖ KeyWrapKey (16) ‖ EMSK (32).

use zeroize::Zeroizing;

use crate::digest::{hmac_sha256, sha256};
use crate::keys::{AuthKey, DevicePassword, Emsk, Msk, Psk, SessionKeys};

/// Personalization string of the WSC key derivation function.
const KDF_PERSONALIZATION: &[u8] = b"Wi-Fi Easy and Secure Key Derivation";

/// Derive the session keys from the Diffie-Hellman shared secret.
pub fn derive_session_keys(
    shared_secret: &[u8],
    enrollee_nonce: &[u8; 16],
    enrollee_mac: &[u8; 6],
    registrar_nonce: &[u8; 16],
) -> SessionKeys {
    let dhkey = Zeroizing::new(sha256(shared_secret));
    let kdk = Zeroizing::new(hmac_sha256(
        dhkey.as_slice(),
        &[enrollee_nonce, enrollee_mac, registrar_nonce],
    ));

    let mut keyblock = Zeroizing::new([0u8; 80]);
    kdf(kdk.as_slice(), keyblock.as_mut_slice());
    SessionKeys::from_keyblock(&keyblock)
}

/// Derive PSK1/PSK2 from the two halves of the device password.
///
/// WSC 2.0.5, Section 7.4: for an odd password length N the first half
/// takes N/2+1 characters and the second half N/2.
pub fn derive_psks(auth_key: &AuthKey, device_password: &DevicePassword) -> (Psk, Psk) {
    let password = device_password.as_bytes();
    let half1 = (password.len() + 1) / 2;

    let digest1 = auth_key.hmac(&[&password[..half1]]);
    let digest2 = auth_key.hmac(&[&password[half1..]]);
    (Psk::from_digest(&digest1), Psk::from_digest(&digest2))
}

/// Expand the EMSK into the 64-byte MSK reported to the outer EAP layer.
pub fn derive_msk(emsk: &Emsk) -> Msk {
    let mut out = Zeroizing::new([0u8; 64]);
    kdf(emsk.as_bytes(), out.as_mut_slice());
    Msk::new(*out)
}

/// Counter-mode KDF over HMAC-SHA-256.
///
/// Each iteration hashes `counter ‖ personalization ‖ total_bits`, both
/// integers big-endian.
fn kdf(key: &[u8], out: &mut [u8]) {
    let total_bits = ((out.len() * 8) as u32).to_be_bytes();
    let mut counter: u32 = 1;
    let mut offset = 0;

    while offset < out.len() {
        let digest = hmac_sha256(
            key,
            &[&counter.to_be_bytes(), KDF_PERSONALIZATION, &total_bits],
        );
        let take = (out.len() - offset).min(digest.len());
        out[offset..offset + take].copy_from_slice(&digest[..take]);
        offset += take;
        counter += 1;
    }
}
