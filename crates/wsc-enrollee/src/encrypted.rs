//! Encrypted Settings transform.
//!
//! WSC 2.0.5, Section 12: the attribute data is an initialization vector
//! followed by AES-CBC ciphertext. The plaintext ends with a
//! KeyWrapAuthenticator attribute over everything before it, and the
//! final block is filled with pad bytes whose value is the pad length.

use wsc_core::error::CryptoError;
use wsc_crypto::aes::AesCbc128;
use wsc_crypto::keys::AuthKey;
use wsc_proto::attr;
use zeroize::Zeroizing;

/// Width of the trailing KeyWrapAuthenticator attribute.
const TRAILER_LEN: usize = 12;

/// Encrypt an inner settings payload, prepending the IV.
pub fn encrypt(
    cipher: &AesCbc128,
    iv: &[u8; 16],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let pad = 16 - plaintext.len() % 16;
    let mut padded = Zeroizing::new(Vec::with_capacity(plaintext.len() + pad));
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad, pad as u8);

    let mut out = Vec::with_capacity(16 + padded.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&cipher.encrypt(iv, &padded)?);
    Ok(out)
}

/// Decrypt an Encrypted Settings payload and strip the padding.
///
/// The ciphertext after the 16-byte IV must hold at least one block; the
/// pad length must be 1..=16 with every pad byte equal to it.
pub fn decrypt(cipher: &AesCbc128, data: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.len() < 16 {
        return Err(CryptoError::MalformedSettings);
    }
    let (iv, ciphertext) = data.split_at(16);
    if ciphertext.len() < 16 || ciphertext.len() % 16 != 0 {
        return Err(CryptoError::MalformedSettings);
    }

    let mut iv_arr = [0u8; 16];
    iv_arr.copy_from_slice(iv);

    let mut plaintext = Zeroizing::new(cipher.decrypt(&iv_arr, ciphertext)?);

    let pad = plaintext[plaintext.len() - 1] as usize;
    if pad == 0 || pad > 16 {
        return Err(CryptoError::InvalidPadding);
    }
    if !plaintext[plaintext.len() - pad..]
        .iter()
        .all(|&byte| byte as usize == pad)
    {
        return Err(CryptoError::InvalidPadding);
    }

    let stripped = plaintext.len() - pad;
    plaintext.truncate(stripped);
    Ok(plaintext)
}

/// Append the KeyWrapAuthenticator attribute over the inner settings.
pub fn append_keywrap(auth_key: &AuthKey, plaintext: &mut Vec<u8>) {
    let digest = auth_key.hmac(&[plaintext.as_slice()]);
    plaintext.extend_from_slice(&attr::KEY_WRAP_AUTHENTICATOR.to_be_bytes());
    plaintext.extend_from_slice(&8u16.to_be_bytes());
    plaintext.extend_from_slice(&digest[..8]);
}

/// Verify the trailing KeyWrapAuthenticator of decrypted settings.
pub fn keywrap_ok(auth_key: &AuthKey, plaintext: &[u8]) -> bool {
    if plaintext.len() < TRAILER_LEN {
        return false;
    }
    let (content, trailer) = plaintext.split_at(plaintext.len() - TRAILER_LEN);
    if trailer[..2] != attr::KEY_WRAP_AUTHENTICATOR.to_be_bytes()
        || trailer[2..4] != 8u16.to_be_bytes()
    {
        return false;
    }
    auth_key.verify_tag8(&[content], &trailer[4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> AesCbc128 {
        AesCbc128::new([0x42; 16])
    }

    fn auth_key() -> AuthKey {
        AuthKey::new([0x5a; 32])
    }

    mod envelope {
        use super::*;

        #[test]
        fn roundtrip() {
            let iv = [0x24; 16];
            let plaintext = vec![0xAB; 20];

            let encrypted = encrypt(&cipher(), &iv, &plaintext).unwrap();
            assert_eq!(&encrypted[..16], &iv);
            // 20 bytes pad to 32
            assert_eq!(encrypted.len(), 16 + 32);

            let decrypted = decrypt(&cipher(), &encrypted).unwrap();
            assert_eq!(*decrypted, plaintext);
        }

        #[test]
        fn block_aligned_input_gains_a_full_pad_block() {
            let iv = [0x24; 16];
            let encrypted = encrypt(&cipher(), &iv, &[0x11; 16]).unwrap();
            assert_eq!(encrypted.len(), 16 + 32);
            assert_eq!(*decrypt(&cipher(), &encrypted).unwrap(), vec![0x11; 16]);
        }

        #[test]
        fn reencryption_with_same_iv_is_stable() {
            let iv = [0x24; 16];
            let plaintext = vec![0xCD; 23];

            let first = encrypt(&cipher(), &iv, &plaintext).unwrap();
            let decrypted = decrypt(&cipher(), &first).unwrap();
            let second = encrypt(&cipher(), &iv, &decrypted).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn rejects_payload_shorter_than_iv() {
            assert!(matches!(
                decrypt(&cipher(), &[0x00; 15]),
                Err(CryptoError::MalformedSettings)
            ));
        }

        #[test]
        fn rejects_empty_ciphertext() {
            assert!(matches!(
                decrypt(&cipher(), &[0x00; 16]),
                Err(CryptoError::MalformedSettings)
            ));
        }

        #[test]
        fn rejects_ragged_ciphertext() {
            assert!(matches!(
                decrypt(&cipher(), &[0x00; 40]),
                Err(CryptoError::MalformedSettings)
            ));
        }

        #[test]
        fn rejects_zero_pad_byte() {
            let iv = [0x24; 16];
            // Hand-build a padded block whose final byte claims pad 0
            let mut padded = vec![0x07; 16];
            padded[15] = 0x00;
            let ciphertext = cipher().encrypt(&iv, &padded).unwrap();

            let mut data = iv.to_vec();
            data.extend_from_slice(&ciphertext);
            assert!(matches!(
                decrypt(&cipher(), &data),
                Err(CryptoError::InvalidPadding)
            ));
        }

        #[test]
        fn rejects_oversized_pad_byte() {
            let iv = [0x24; 16];
            let mut padded = vec![0x07; 16];
            padded[15] = 0x11;
            let ciphertext = cipher().encrypt(&iv, &padded).unwrap();

            let mut data = iv.to_vec();
            data.extend_from_slice(&ciphertext);
            assert!(matches!(
                decrypt(&cipher(), &data),
                Err(CryptoError::InvalidPadding)
            ));
        }

        #[test]
        fn rejects_ragged_pad_run() {
            let iv = [0x24; 16];
            // Claims three pad bytes but only the last two match
            let mut padded = vec![0x07; 16];
            padded[15] = 0x03;
            padded[14] = 0x03;
            padded[13] = 0x02;
            let ciphertext = cipher().encrypt(&iv, &padded).unwrap();

            let mut data = iv.to_vec();
            data.extend_from_slice(&ciphertext);
            assert!(matches!(
                decrypt(&cipher(), &data),
                Err(CryptoError::InvalidPadding)
            ));
        }

        #[test]
        fn accepts_full_block_of_padding() {
            let iv = [0x24; 16];
            let padded = vec![0x10; 16];
            let ciphertext = cipher().encrypt(&iv, &padded).unwrap();

            let mut data = iv.to_vec();
            data.extend_from_slice(&ciphertext);
            assert!(decrypt(&cipher(), &data).unwrap().is_empty());
        }
    }

    mod keywrap {
        use super::*;

        #[test]
        fn append_then_verify() {
            let mut plaintext = vec![0x10, 0x3f, 0x00, 0x01, 0xaa];
            append_keywrap(&auth_key(), &mut plaintext);

            assert_eq!(plaintext.len(), 5 + 12);
            assert!(keywrap_ok(&auth_key(), &plaintext));
        }

        #[test]
        fn rejects_tampered_content() {
            let mut plaintext = vec![0x10, 0x3f, 0x00, 0x01, 0xaa];
            append_keywrap(&auth_key(), &mut plaintext);

            plaintext[4] ^= 0x01;
            assert!(!keywrap_ok(&auth_key(), &plaintext));
        }

        #[test]
        fn rejects_truncated_plaintext() {
            assert!(!keywrap_ok(&auth_key(), &[0x00; 11]));
        }

        #[test]
        fn rejects_missing_trailer_attribute() {
            // Right length, wrong trailing attribute type
            let plaintext = vec![0x00; 20];
            assert!(!keywrap_ok(&auth_key(), &plaintext));
        }

        #[test]
        fn smallest_payload_fits_two_blocks() {
            // 16-byte nonce attribute (20 bytes) + 12-byte trailer = 32
            let mut plaintext = Vec::new();
            plaintext.extend_from_slice(&[0x10, 0x3f, 0x00, 0x10]);
            plaintext.extend_from_slice(&[0xaa; 16]);
            append_keywrap(&auth_key(), &mut plaintext);
            assert_eq!(plaintext.len(), 32);

            let iv = [0x24; 16];
            let encrypted = encrypt(&cipher(), &iv, &plaintext).unwrap();
            // One extra full pad block
            assert_eq!(encrypted.len(), 16 + 48);

            let decrypted = decrypt(&cipher(), &encrypted).unwrap();
            assert!(keywrap_ok(&auth_key(), &decrypted));
        }
    }
}
