//! The Enrollee state machine.
//!
//! One inbound EAP-WSC frame drives at most one transition. Handlers
//! return the frames to transmit instead of pushing them through a side
//! channel, so the whole exchange is observable (and testable) as a
//! sequence of [`Event`]s.

use tracing::{debug, warn};
use zeroize::Zeroizing;

use wsc_crypto::aes::AesCbc128;
use wsc_crypto::dh::DhPrivateKey;
use wsc_crypto::kdf;
use wsc_crypto::keys::{AuthKey, DevicePassword, Emsk, Msk, Psk, SessionKeys};
use wsc_proto::device::ConfigurationError;
use wsc_proto::frame::{self, Frame, Op};
use wsc_proto::msg::{
    Credential, Done, Message, M1, M2, M3, M4EncryptedSettings, M5, M5EncryptedSettings,
    M6EncryptedSettings, M7, M7EncryptedSettings, M8EncryptedSettings, Nack,
};

use crate::authenticator;
use crate::encrypted;
use crate::settings::EnrolleeSettings;

/// Protocol position of the Enrollee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    ExpectStart,
    ExpectM2,
    ExpectM4,
    ExpectM6,
    ExpectM8,
    Finished,
    /// The Registrar aborted the exchange with a NACK.
    Failed,
}

/// Result of a completed exchange.
pub struct Completion {
    /// Credentials extracted from M8, in wire order.
    pub credentials: Vec<Credential>,
    /// Extended Master Session Key from the key schedule.
    pub emsk: Emsk,
    /// 64-byte Master Session Key expanded from the EMSK.
    pub msk: Msk,
}

/// Observable outcome of feeding one inbound frame.
pub enum Event {
    /// Transmit this EAP-WSC frame (opcode and flags included).
    Send(Vec<u8>),
    /// The exchange finished; credentials and key material follow.
    Complete(Completion),
    /// The Registrar aborted the exchange.
    Failed(ConfigurationError),
}

/// One Enrollee session.
///
/// All key material lives in zeroize-on-drop wrappers, so tearing the
/// session down in any state wipes the private key, the device password,
/// the derived keys and the secret nonces.
pub struct Enrollee {
    state: State,
    m1: M1,
    m2: Option<M2>,
    /// Body of our most recent outgoing registration message; the next
    /// inbound Authenticator chains over it.
    sent_pdu: Vec<u8>,
    private_key: DhPrivateKey,
    device_password: DevicePassword,
    e_snonce1: Zeroizing<[u8; 16]>,
    e_snonce2: Zeroizing<[u8; 16]>,
    iv1: [u8; 16],
    iv2: [u8; 16],
    psk1: Option<Psk>,
    psk2: Option<Psk>,
    /// Expected R-Hash2, captured from M4 and verified against M6.
    r_hash2: Option<[u8; 32]>,
    auth_key: Option<AuthKey>,
    cipher: Option<AesCbc128>,
    emsk: Option<Emsk>,
}

impl Enrollee {
    pub fn new(settings: EnrolleeSettings) -> Self {
        Self {
            state: State::ExpectStart,
            m1: settings.m1,
            m2: None,
            sent_pdu: Vec::new(),
            private_key: settings.private_key,
            device_password: settings.device_password,
            e_snonce1: settings.e_snonce1,
            e_snonce2: settings.e_snonce2,
            iv1: settings.iv1,
            iv2: settings.iv2,
            psk1: None,
            psk2: None,
            r_hash2: None,
            auth_key: None,
            cipher: None,
            emsk: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Feed one inbound EAP-WSC packet (opcode, flags, body).
    pub fn handle_request(&mut self, pkt: &[u8]) -> Vec<Event> {
        let frame = match Frame::parse(pkt) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dropping unparseable frame: {e}");
                return Vec::new();
            }
        };

        if frame.flags != 0 {
            // TODO: reassemble fragmented peers; until then drop them
            debug!(flags = frame.flags, "dropping fragmented frame");
            return Vec::new();
        }

        match frame.op {
            Op::Start => self.handle_start(frame.body),
            Op::Nack => self.handle_peer_nack(frame.body),
            // Never addressed to an Enrollee
            Op::Ack | Op::Done | Op::FragAck => Vec::new(),
            Op::Msg => self.handle_msg(frame.body),
        }
    }

    fn handle_start(&mut self, body: &[u8]) -> Vec<Event> {
        if !body.is_empty() {
            return Vec::new();
        }
        if self.state != State::ExpectStart {
            debug!(state = ?self.state, "ignoring unexpected START");
            return Vec::new();
        }

        let pdu = self.m1.build();
        debug!("sending M1");
        let event = self.send_msg(pdu);
        self.state = State::ExpectM2;
        vec![event]
    }

    fn handle_peer_nack(&mut self, body: &[u8]) -> Vec<Event> {
        if matches!(self.state, State::Finished | State::Failed) {
            return Vec::new();
        }

        let error = match Message::parse(body) {
            Ok(Message::Nack(nack)) => nack.configuration_error,
            _ => ConfigurationError::NO_ERROR,
        };
        warn!(%error, "registrar aborted the exchange");
        self.state = State::Failed;
        vec![Event::Failed(error)]
    }

    fn handle_msg(&mut self, body: &[u8]) -> Vec<Event> {
        if body.is_empty() {
            return Vec::new();
        }

        match self.state {
            State::ExpectStart | State::Failed => Vec::new(),
            State::ExpectM2 => self.handle_m2(body),
            State::ExpectM4 => self.handle_m4(body),
            State::ExpectM6 => self.handle_m6(body),
            State::ExpectM8 => self.handle_m8(body),
            State::Finished => self.nack(ConfigurationError::NO_ERROR),
        }
    }

    /// Build a NACK, or nothing at all.
    ///
    /// WSC 2.0.5 contradicts itself about mis-sequenced messages: Table 34
    /// forbids configuration error 0 in a NACK outside External Registrar
    /// use, Section 7.7.3 wants a NACK once M5 is out, and Section 7.1
    /// wants bad Authenticators ignored silently. Decision making is
    /// centralized here: callers pass error 0 for every such case and the
    /// NACK is suppressed into a silent drop.
    fn nack(&self, error: ConfigurationError) -> Vec<Event> {
        if error == ConfigurationError::NO_ERROR {
            return Vec::new();
        }

        let nack = Nack {
            enrollee_nonce: self.m1.enrollee_nonce,
            registrar_nonce: self
                .m2
                .as_ref()
                .map(|m2| m2.registrar_nonce)
                .unwrap_or([0u8; 16]),
            configuration_error: error,
        };
        warn!(%error, "sending NACK");
        vec![Event::Send(frame::encode(Op::Nack, &nack.build()))]
    }

    /// Record and frame an outgoing registration message.
    fn send_msg(&mut self, body: Vec<u8>) -> Event {
        let pkt = frame::encode(Op::Msg, &body);
        self.sent_pdu = body;
        Event::Send(pkt)
    }

    fn handle_m2(&mut self, body: &[u8]) -> Vec<Event> {
        // TODO: distinguish M2D before treating the payload as M2
        let m2 = match Message::parse(body) {
            Ok(Message::M2(m2)) => m2,
            Ok(_) | Err(_) => {
                debug!("unusable payload while waiting for M2");
                return self.nack(ConfigurationError::NO_ERROR);
            }
        };

        let shared_secret = match self.private_key.shared_secret(&m2.public_key) {
            Ok(secret) => secret,
            Err(e) => {
                warn!("key agreement against M2 public key failed: {e}");
                return Vec::new();
            }
        };

        let SessionKeys {
            auth_key,
            keywrap_key,
            emsk,
        } = kdf::derive_session_keys(
            &shared_secret,
            &self.m1.enrollee_nonce,
            &self.m1.addr,
            &m2.registrar_nonce,
        );
        drop(shared_secret);

        // Our M1 is the previous message in the chain
        if !authenticator::verify(&auth_key, &self.sent_pdu, body) {
            warn!("M2 Authenticator mismatch, dropping");
            return Vec::new();
        }

        self.cipher = Some(AesCbc128::new(*keywrap_key.as_bytes()));
        self.auth_key = Some(auth_key);
        self.emsk = Some(emsk);
        self.m2 = Some(m2);

        self.send_m3(body)
    }

    fn send_m3(&mut self, m2_body: &[u8]) -> Vec<Event> {
        let Some(auth_key) = self.auth_key.clone() else {
            return Vec::new();
        };
        let Some(m2) = self.m2.as_ref() else {
            return Vec::new();
        };

        let (psk1, psk2) = kdf::derive_psks(&auth_key, &self.device_password);

        // E-Hash1 = HMAC-AuthKey(E-S1 ‖ PSK1 ‖ PKE ‖ PKR), same for 2
        let e_hash1 = auth_key.hmac(&[
            self.e_snonce1.as_slice(),
            psk1.as_bytes(),
            &self.m1.public_key,
            &m2.public_key,
        ]);
        let e_hash2 = auth_key.hmac(&[
            self.e_snonce2.as_slice(),
            psk2.as_bytes(),
            &self.m1.public_key,
            &m2.public_key,
        ]);

        let m3 = M3 {
            registrar_nonce: m2.registrar_nonce,
            e_hash1,
            e_hash2,
        };
        let mut pdu = m3.build();
        authenticator::append(&auth_key, m2_body, &mut pdu);

        self.psk1 = Some(psk1);
        self.psk2 = Some(psk2);

        debug!("sending M3");
        let event = self.send_msg(pdu);
        self.state = State::ExpectM4;
        vec![event]
    }

    fn handle_m4(&mut self, body: &[u8]) -> Vec<Event> {
        let m4 = match Message::parse(body) {
            Ok(Message::M4(m4)) => m4,
            Ok(_) | Err(_) => {
                debug!("unusable payload while waiting for M4");
                return self.nack(ConfigurationError::NO_ERROR);
            }
        };

        let Some(auth_key) = self.auth_key.clone() else {
            return Vec::new();
        };
        if !authenticator::verify(&auth_key, &self.sent_pdu, body) {
            warn!("M4 Authenticator mismatch, dropping");
            return Vec::new();
        }

        let plaintext = match self.decrypt_settings(&m4.encrypted_settings) {
            Some(plaintext) => plaintext,
            None => return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE),
        };
        let settings = match M4EncryptedSettings::parse(&plaintext) {
            Ok(settings) => settings,
            Err(e) => {
                debug!("invalid M4 settings: {e}");
                return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE);
            }
        };
        if !encrypted::keywrap_ok(&auth_key, &plaintext) {
            warn!("M4 KeyWrapAuthenticator mismatch");
            return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE);
        }

        // R-SNonce1 in hand, R-Hash1 becomes checkable
        let Some(psk1) = self.psk1.clone() else {
            return Vec::new();
        };
        if !self.r_hash_ok(&auth_key, &settings.r_snonce1, &psk1, &m4.r_hash1) {
            warn!("R-Hash1 mismatch, wrong device password");
            return self.nack(ConfigurationError::DEVICE_PASSWORD_AUTH_FAILURE);
        }

        // Hold on to R-Hash2 until M6 reveals R-SNonce2
        self.r_hash2 = Some(m4.r_hash2);
        self.send_m5(body)
    }

    fn send_m5(&mut self, m4_body: &[u8]) -> Vec<Event> {
        let Some(auth_key) = self.auth_key.clone() else {
            return Vec::new();
        };
        let Some(registrar_nonce) = self.m2.as_ref().map(|m2| m2.registrar_nonce) else {
            return Vec::new();
        };

        let mut inner = Zeroizing::new(
            M5EncryptedSettings {
                e_snonce1: *self.e_snonce1,
            }
            .build(),
        );
        encrypted::append_keywrap(&auth_key, &mut inner);

        let Some(encrypted_settings) = self.encrypt_settings(&self.iv1, &inner) else {
            return Vec::new();
        };

        let m5 = M5 {
            registrar_nonce,
            encrypted_settings,
        };
        let mut pdu = m5.build();
        authenticator::append(&auth_key, m4_body, &mut pdu);

        debug!("sending M5");
        let event = self.send_msg(pdu);
        self.state = State::ExpectM6;
        vec![event]
    }

    fn handle_m6(&mut self, body: &[u8]) -> Vec<Event> {
        let m6 = match Message::parse(body) {
            Ok(Message::M6(m6)) => m6,
            Ok(_) | Err(_) => {
                debug!("unusable payload while waiting for M6");
                return self.nack(ConfigurationError::NO_ERROR);
            }
        };

        let Some(auth_key) = self.auth_key.clone() else {
            return Vec::new();
        };
        if !authenticator::verify(&auth_key, &self.sent_pdu, body) {
            warn!("M6 Authenticator mismatch, dropping");
            return Vec::new();
        }

        let plaintext = match self.decrypt_settings(&m6.encrypted_settings) {
            Some(plaintext) => plaintext,
            None => return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE),
        };
        let settings = match M6EncryptedSettings::parse(&plaintext) {
            Ok(settings) => settings,
            Err(e) => {
                debug!("invalid M6 settings: {e}");
                return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE);
            }
        };
        if !encrypted::keywrap_ok(&auth_key, &plaintext) {
            warn!("M6 KeyWrapAuthenticator mismatch");
            return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE);
        }

        // R-SNonce2 in hand, verify the R-Hash2 stored at M4
        let (Some(psk2), Some(r_hash2)) = (self.psk2.clone(), self.r_hash2) else {
            return Vec::new();
        };
        if !self.r_hash_ok(&auth_key, &settings.r_snonce2, &psk2, &r_hash2) {
            warn!("R-Hash2 mismatch, wrong device password");
            return self.nack(ConfigurationError::DEVICE_PASSWORD_AUTH_FAILURE);
        }

        self.send_m7(body)
    }

    fn send_m7(&mut self, m6_body: &[u8]) -> Vec<Event> {
        let Some(auth_key) = self.auth_key.clone() else {
            return Vec::new();
        };
        let Some(registrar_nonce) = self.m2.as_ref().map(|m2| m2.registrar_nonce) else {
            return Vec::new();
        };

        let mut inner = Zeroizing::new(
            M7EncryptedSettings {
                e_snonce2: *self.e_snonce2,
            }
            .build(),
        );
        encrypted::append_keywrap(&auth_key, &mut inner);

        let Some(encrypted_settings) = self.encrypt_settings(&self.iv2, &inner) else {
            return Vec::new();
        };

        let m7 = M7 {
            registrar_nonce,
            encrypted_settings,
        };
        let mut pdu = m7.build();
        authenticator::append(&auth_key, m6_body, &mut pdu);

        debug!("sending M7");
        let event = self.send_msg(pdu);
        self.state = State::ExpectM8;
        vec![event]
    }

    fn handle_m8(&mut self, body: &[u8]) -> Vec<Event> {
        let m8 = match Message::parse(body) {
            Ok(Message::M8(m8)) => m8,
            Ok(_) | Err(_) => {
                debug!("unusable payload while waiting for M8");
                return self.nack(ConfigurationError::NO_ERROR);
            }
        };

        let Some(auth_key) = self.auth_key.clone() else {
            return Vec::new();
        };
        if !authenticator::verify(&auth_key, &self.sent_pdu, body) {
            warn!("M8 Authenticator mismatch, dropping");
            return Vec::new();
        }

        let plaintext = match self.decrypt_settings(&m8.encrypted_settings) {
            Some(plaintext) => plaintext,
            None => return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE),
        };
        let settings = match M8EncryptedSettings::parse(&plaintext) {
            Ok(settings) => settings,
            Err(e) => {
                debug!("invalid M8 settings: {e}");
                return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE);
            }
        };
        if !encrypted::keywrap_ok(&auth_key, &plaintext) {
            warn!("M8 KeyWrapAuthenticator mismatch");
            return self.nack(ConfigurationError::DECRYPTION_CRC_FAILURE);
        }

        let (Some(emsk), Some(registrar_nonce)) =
            (self.emsk.take(), self.m2.as_ref().map(|m2| m2.registrar_nonce))
        else {
            return Vec::new();
        };
        let msk = kdf::derive_msk(&emsk);

        let done = Done {
            enrollee_nonce: self.m1.enrollee_nonce,
            registrar_nonce,
        };

        debug!(
            credentials = settings.credentials.len(),
            "registration complete, sending DONE"
        );
        self.state = State::Finished;
        vec![
            Event::Send(frame::encode(Op::Done, &done.build())),
            Event::Complete(Completion {
                credentials: settings.credentials,
                emsk,
                msk,
            }),
        ]
    }

    fn decrypt_settings(&self, data: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
        let cipher = self.cipher.as_ref()?;
        match encrypted::decrypt(cipher, data) {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                debug!("encrypted settings rejected: {e}");
                None
            }
        }
    }

    fn encrypt_settings(&self, iv: &[u8; 16], plaintext: &[u8]) -> Option<Vec<u8>> {
        let cipher = self.cipher.as_ref()?;
        encrypted::encrypt(cipher, iv, plaintext).ok()
    }

    fn r_hash_ok(
        &self,
        auth_key: &AuthKey,
        r_snonce: &[u8; 16],
        psk: &Psk,
        expected: &[u8; 32],
    ) -> bool {
        let Some(m2) = self.m2.as_ref() else {
            return false;
        };
        auth_key.verify_hash32(
            &[r_snonce, psk.as_bytes(), &self.m1.public_key, &m2.public_key],
            expected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsc_core::config::WscConfig;

    fn enrollee() -> Enrollee {
        let config = WscConfig {
            enrollee_mac: Some("02:00:00:00:00:01".to_string()),
            rf_band: Some(1),
            device_password: Some("12345670".to_string()),
            ..WscConfig::default()
        };
        Enrollee::new(EnrolleeSettings::from_config(&config).unwrap())
    }

    fn assert_silent(events: Vec<Event>) {
        assert!(events.is_empty());
    }

    mod framing {
        use super::*;

        #[test]
        fn short_packet_is_dropped() {
            let mut session = enrollee();
            assert_silent(session.handle_request(&[0x01]));
            assert_eq!(session.state(), State::ExpectStart);
        }

        #[test]
        fn unknown_opcode_is_dropped() {
            let mut session = enrollee();
            assert_silent(session.handle_request(&[0x07, 0x00]));
            assert_eq!(session.state(), State::ExpectStart);
        }

        #[test]
        fn fragmented_frame_is_dropped() {
            let mut session = enrollee();
            assert_silent(session.handle_request(&[0x01, 0x01]));
            assert_eq!(session.state(), State::ExpectStart);
        }
    }

    mod start {
        use super::*;

        #[test]
        fn start_emits_m1_and_advances() {
            let mut session = enrollee();
            let events = session.handle_request(&[0x01, 0x00]);

            assert_eq!(events.len(), 1);
            let Event::Send(pkt) = &events[0] else {
                panic!("expected a frame");
            };
            assert_eq!(pkt[0], Op::Msg as u8);
            assert_eq!(pkt[1], 0);
            assert!(matches!(Message::parse(&pkt[2..]), Ok(Message::M1(_))));
            assert_eq!(session.state(), State::ExpectM2);
        }

        #[test]
        fn start_with_payload_is_ignored() {
            let mut session = enrollee();
            assert_silent(session.handle_request(&[0x01, 0x00, 0xff]));
            assert_eq!(session.state(), State::ExpectStart);
        }

        #[test]
        fn repeated_start_is_ignored() {
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);
            assert_silent(session.handle_request(&[0x01, 0x00]));
            assert_eq!(session.state(), State::ExpectM2);
        }
    }

    mod sequencing {
        use super::*;

        #[test]
        fn msg_before_start_is_ignored() {
            let mut session = enrollee();
            assert_silent(session.handle_request(&[0x04, 0x00, 0xde, 0xad]));
            assert_eq!(session.state(), State::ExpectStart);
        }

        #[test]
        fn empty_msg_is_ignored() {
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);
            assert_silent(session.handle_request(&[0x04, 0x00]));
            assert_eq!(session.state(), State::ExpectM2);
        }

        #[test]
        fn garbage_msg_while_waiting_for_m2_is_suppressed() {
            // Parse failures funnel through the code-0 NACK, which is
            // swallowed rather than transmitted
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);
            assert_silent(session.handle_request(&[0x04, 0x00, 0xde, 0xad, 0xbe, 0xef]));
            assert_eq!(session.state(), State::ExpectM2);
        }

        #[test]
        fn ack_and_done_are_ignored() {
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);
            assert_silent(session.handle_request(&[0x02, 0x00]));
            assert_silent(session.handle_request(&[0x05, 0x00]));
            assert_eq!(session.state(), State::ExpectM2);
        }
    }

    mod peer_nack {
        use super::*;

        #[test]
        fn nack_aborts_the_session() {
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);

            let nack = Nack {
                enrollee_nonce: [0x00; 16],
                registrar_nonce: [0x00; 16],
                configuration_error: ConfigurationError(0x0010),
            };
            let events = session.handle_request(&frame::encode(Op::Nack, &nack.build()));

            assert_eq!(events.len(), 1);
            assert!(matches!(
                events[0],
                Event::Failed(ConfigurationError(0x0010))
            ));
            assert_eq!(session.state(), State::Failed);
        }

        #[test]
        fn failed_session_ignores_further_traffic() {
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);
            let nack = Nack {
                enrollee_nonce: [0x00; 16],
                registrar_nonce: [0x00; 16],
                configuration_error: ConfigurationError(0x0010),
            };
            session.handle_request(&frame::encode(Op::Nack, &nack.build()));

            assert_silent(session.handle_request(&[0x01, 0x00]));
            assert_silent(session.handle_request(&[0x04, 0x00, 0xde, 0xad]));
            assert_eq!(session.state(), State::Failed);
        }

        #[test]
        fn unparseable_nack_still_aborts() {
            let mut session = enrollee();
            session.handle_request(&[0x01, 0x00]);
            let events = session.handle_request(&[0x03, 0x00, 0xff]);
            assert_eq!(events.len(), 1);
            assert!(matches!(
                events[0],
                Event::Failed(ConfigurationError::NO_ERROR)
            ));
        }
    }
}
