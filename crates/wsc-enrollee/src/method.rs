//! EAP method surface: registration metadata and session lifecycle.
//!
//! The outer EAP engine matches inbound Expanded-type requests against
//! the vendor id/type below, probes the method by name, loads settings
//! and then feeds request payloads one at a time.

use tracing::debug;
use wsc_core::config::WscConfig;
use wsc_core::error::ConfigError;

use crate::session::{Enrollee, Event, State};
use crate::settings::EnrolleeSettings;
use crate::traits::{EapTransport, EnrolleeHandler};

/// EAP Expanded type (RFC 3748).
pub const EAP_TYPE_EXPANDED: u8 = 254;
/// WFA SMI code carried in the expanded header.
pub const VENDOR_ID: [u8; 3] = [0x00, 0x37, 0x2a];
/// Simple Configuration vendor type.
pub const VENDOR_TYPE: u32 = 0x0000_0001;
/// Method name matched by [`WscMethod::probe`].
pub const METHOD_NAME: &str = "WSC";

/// One registered EAP-WSC method instance.
pub struct WscMethod {
    enrollee: Option<Enrollee>,
}

impl WscMethod {
    /// EAP method probe; accepts only the WSC method name.
    pub fn probe(name: &str) -> Option<Self> {
        if !name.eq_ignore_ascii_case(METHOD_NAME) {
            return None;
        }
        Some(Self { enrollee: None })
    }

    /// The method exports an MSK on success.
    pub fn exports_msk(&self) -> bool {
        true
    }

    /// Load the Enrollee identity and secrets from configuration.
    ///
    /// Failure leaves the method unusable; no session starts.
    pub fn load_settings(&mut self, config: &WscConfig) -> Result<(), ConfigError> {
        let settings = EnrolleeSettings::from_config(config)?;
        self.enrollee = Some(Enrollee::new(settings));
        debug!("WSC method configured");
        Ok(())
    }

    /// Current session state, when configured.
    pub fn state(&self) -> Option<State> {
        self.enrollee.as_ref().map(Enrollee::state)
    }

    /// Feed one inbound EAP-WSC request payload.
    ///
    /// Responses go out through `transport`; completion or abort is
    /// reported through `handler`.
    pub fn handle_request(
        &mut self,
        transport: &mut dyn EapTransport,
        handler: &mut dyn EnrolleeHandler,
        pkt: &[u8],
    ) {
        let Some(enrollee) = self.enrollee.as_mut() else {
            debug!("request before load_settings, dropping");
            return;
        };

        for event in enrollee.handle_request(pkt) {
            match event {
                Event::Send(frame) => transport.send_response(EAP_TYPE_EXPANDED, &frame),
                Event::Complete(completion) => handler.on_complete(completion),
                Event::Failed(error) => handler.on_failed(error),
            }
        }
    }

    /// Tear the session down. Key material is zeroized as the session
    /// drops; safe to call in any state.
    pub fn remove(&mut self) {
        self.enrollee = None;
    }
}
