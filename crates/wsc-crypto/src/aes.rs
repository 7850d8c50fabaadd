//! AES-128-CBC keyed with the KeyWrapKey.
//!
//! Encrypted Settings payloads supply a fresh IV per message, so the IV
//! is a per-call argument rather than cipher state.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use wsc_core::error::CryptoError;
use zeroize::ZeroizeOnDrop;

/// AES-128-CBC cipher over 16-byte blocks.
#[derive(ZeroizeOnDrop)]
pub struct AesCbc128 {
    key: [u8; 16],
}

impl AesCbc128 {
    /// Create cipher with a 16-byte key.
    pub fn new(key: [u8; 16]) -> Self {
        Self { key }
    }

    /// Encrypt plaintext (must be a multiple of 16 bytes).
    pub fn encrypt(&self, iv: &[u8; 16], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if plaintext.len() % 16 != 0 {
            return Err(CryptoError::BlockAlignment);
        }

        let cipher = Aes128::new_from_slice(&self.key).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: 16,
                actual: self.key.len(),
            }
        })?;

        let mut ciphertext = Vec::with_capacity(plaintext.len());
        let mut prev_block = *iv;

        for chunk in plaintext.chunks(16) {
            // XOR with previous ciphertext (or IV for first block)
            let mut block = [0u8; 16];
            for i in 0..16 {
                block[i] = chunk[i] ^ prev_block[i];
            }

            let block_arr = aes::Block::from_mut_slice(&mut block);
            cipher.encrypt_block(block_arr);

            prev_block = block;
            ciphertext.extend_from_slice(&block);
        }

        Ok(ciphertext)
    }

    /// Decrypt ciphertext (must be a multiple of 16 bytes).
    pub fn decrypt(&self, iv: &[u8; 16], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() % 16 != 0 {
            return Err(CryptoError::BlockAlignment);
        }

        let cipher = Aes128::new_from_slice(&self.key).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: 16,
                actual: self.key.len(),
            }
        })?;

        let mut plaintext = Vec::with_capacity(ciphertext.len());
        let mut prev_block = *iv;

        for chunk in ciphertext.chunks(16) {
            let mut block = [0u8; 16];
            block.copy_from_slice(chunk);

            let block_arr = aes::Block::from_mut_slice(&mut block);
            cipher.decrypt_block(block_arr);

            // XOR with previous ciphertext (or IV for first block)
            for i in 0..16 {
                block[i] ^= prev_block[i];
            }

            prev_block.copy_from_slice(chunk);
            plaintext.extend_from_slice(&block);
        }

        Ok(plaintext)
    }
}
