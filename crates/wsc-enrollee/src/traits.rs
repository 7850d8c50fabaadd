//! Seams to the outer EAP engine.

use wsc_proto::device::ConfigurationError;

use crate::session::Completion;

/// Outbound path into the outer EAP framing engine.
///
/// The engine owns retransmission, timeouts and the EAP header; it
/// receives the EAP-WSC payload (opcode, flags, body) ready to wrap.
#[cfg_attr(test, mockall::automock)]
pub trait EapTransport {
    /// Transmit one response PDU. `eap_type` is EAP Expanded here.
    fn send_response(&mut self, eap_type: u8, pdu: &[u8]);
}

/// Result channel for the finished exchange.
#[cfg_attr(test, mockall::automock)]
pub trait EnrolleeHandler {
    /// Credentials extracted from M8, with the exported key material.
    fn on_complete(&mut self, completion: Completion);

    /// The Registrar aborted the exchange.
    fn on_failed(&mut self, error: ConfigurationError);
}
