//! Diffie-Hellman group 5 (RFC 3526, 1536-bit MODP) key agreement.

use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use wsc_core::error::CryptoError;
use zeroize::{ZeroizeOnDrop, Zeroizing};

/// Private and public key size in bytes (1536 bits).
pub const KEY_LEN: usize = 192;

/// RFC 3526 group 5 prime as hex.
const MODP_1536_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF"
);

/// Group 5 parameters (1536-bit, RFC 3526).
pub struct DhGroup {
    /// Prime modulus p.
    pub prime: BigUint,
    /// Generator g (always 2).
    pub generator: BigUint,
}

impl Default for DhGroup {
    fn default() -> Self {
        let prime = BigUint::parse_bytes(MODP_1536_PRIME.as_bytes(), 16)
            .expect("Invalid RFC 3526 prime constant");
        let generator = BigUint::from(2u32);
        Self { prime, generator }
    }
}

/// Enrollee-side Diffie-Hellman private key.
#[derive(ZeroizeOnDrop)]
pub struct DhPrivateKey {
    bytes: [u8; KEY_LEN],
}

impl DhPrivateKey {
    /// Generate a random private key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create from existing key bytes (deterministic test vectors).
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Compute the public key `g^a mod p`, zero-padded to 192 bytes.
    pub fn public_key(&self) -> [u8; KEY_LEN] {
        let group = DhGroup::default();
        let a = BigUint::from_bytes_be(&self.bytes);
        pad_to_key_len(&group.generator.modpow(&a, &group.prime))
    }

    /// Perform the key agreement against the peer's 192-byte public key.
    ///
    /// Returns the shared secret in its minimal big-endian form (up to
    /// 192 bytes). Degenerate peer keys and degenerate results are
    /// rejected.
    pub fn shared_secret(
        &self,
        peer_public: &[u8; KEY_LEN],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let group = DhGroup::default();
        let one = BigUint::from(1u32);

        let peer = BigUint::from_bytes_be(peer_public);
        if peer <= one || peer >= group.prime {
            return Err(CryptoError::InvalidPeerKey);
        }

        let a = BigUint::from_bytes_be(&self.bytes);
        let shared = peer.modpow(&a, &group.prime);
        if shared <= one {
            return Err(CryptoError::WeakSharedSecret);
        }

        Ok(Zeroizing::new(shared.to_bytes_be()))
    }
}

/// Left-pad a group element to the full 192-byte width.
fn pad_to_key_len(value: &BigUint) -> [u8; KEY_LEN] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; KEY_LEN];
    out[KEY_LEN - bytes.len()..].copy_from_slice(&bytes);
    out
}
