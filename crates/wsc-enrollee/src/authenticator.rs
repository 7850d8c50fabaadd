//! The running Authenticator chain.
//!
//! WSC 2.0.5, Section 7.4: every message after M1 carries a trailing
//! Authenticator attribute whose value is the first 8 bytes of
//! `HMAC-AuthKey(previous message ‖ current message)`, where the current
//! message excludes the Authenticator attribute itself. On the Enrollee
//! side "previous message" is always our own most recently sent body.

use wsc_crypto::keys::AuthKey;
use wsc_proto::attr;

/// Width of the trailing Authenticator attribute (header + 8-byte tag).
const TRAILER_LEN: usize = 12;

/// Append the Authenticator attribute to an outgoing message body.
pub fn append(auth_key: &AuthKey, prev: &[u8], body: &mut Vec<u8>) {
    let digest = auth_key.hmac(&[prev, body]);
    body.extend_from_slice(&attr::AUTHENTICATOR.to_be_bytes());
    body.extend_from_slice(&8u16.to_be_bytes());
    body.extend_from_slice(&digest[..8]);
}

/// Verify the trailing Authenticator of an inbound message body.
///
/// The last 12 bytes must be the Authenticator attribute itself; its tag
/// is compared in constant time.
pub fn verify(auth_key: &AuthKey, prev: &[u8], body: &[u8]) -> bool {
    if body.len() < TRAILER_LEN {
        return false;
    }
    let (content, trailer) = body.split_at(body.len() - TRAILER_LEN);
    if trailer[..2] != attr::AUTHENTICATOR.to_be_bytes()
        || trailer[2..4] != 8u16.to_be_bytes()
    {
        return false;
    }
    auth_key.verify_tag8(&[prev, content], &trailer[4..])
}
