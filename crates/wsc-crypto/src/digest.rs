//! SHA-256 and HMAC-SHA-256 adapters.
//!
//! Every hash in the registration protocol runs over a concatenation of
//! message fields, so the HMAC entry point takes the parts directly
//! instead of forcing callers to assemble a scratch buffer.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Compute SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute HMAC-SHA-256 over the concatenation of `parts`.
pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // FIPS 180-2 test vector for "abc"
        assert_eq!(
            sha256(b"abc").to_vec(),
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap()
        );
    }

    #[test]
    fn hmac_sha256_rfc4231_case_1() {
        let key = [0x0b; 20];
        let digest = hmac_sha256(&key, &[b"Hi There"]);
        assert_eq!(
            digest.to_vec(),
            hex::decode("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
                .unwrap()
        );
    }

    #[test]
    fn hmac_sha256_rfc4231_case_2() {
        let digest = hmac_sha256(b"Jefe", &[b"what do ya want ", b"for nothing?"]);
        assert_eq!(
            digest.to_vec(),
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
                .unwrap()
        );
    }

    #[test]
    fn split_input_matches_contiguous_input() {
        let key = [0x42; 32];
        let whole = hmac_sha256(&key, &[b"abcdef"]);
        let split = hmac_sha256(&key, &[b"ab", b"cd", b"ef"]);
        assert_eq!(whole, split);
    }
}
