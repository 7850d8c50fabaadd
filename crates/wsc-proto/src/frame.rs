//! EAP-WSC operation framing.
//!
//! WSC 2.0.5, Section 7.7.1: every EAP-WSC payload starts with a one-byte
//! opcode and a one-byte flags field; the message body follows.

use wsc_core::error::ParseError;

/// Opcodes carried in the first byte of each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    Start = 0x01,
    Ack = 0x02,
    Nack = 0x03,
    Msg = 0x04,
    Done = 0x05,
    FragAck = 0x06,
}

impl TryFrom<u8> for Op {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Start),
            0x02 => Ok(Self::Ack),
            0x03 => Ok(Self::Nack),
            0x04 => Ok(Self::Msg),
            0x05 => Ok(Self::Done),
            0x06 => Ok(Self::FragAck),
            other => Err(ParseError::UnknownOp(other)),
        }
    }
}

/// More fragments follow.
pub const FLAG_MORE_FRAGMENTS: u8 = 0x01;
/// A two-byte total-length field precedes the body.
pub const FLAG_LENGTH_FIELD: u8 = 0x02;

/// A decoded EAP-WSC frame borrowing the packet buffer.
#[derive(Debug)]
pub struct Frame<'a> {
    pub op: Op,
    pub flags: u8,
    pub body: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn parse(pkt: &'a [u8]) -> Result<Self, ParseError> {
        if pkt.len() < 2 {
            return Err(ParseError::FrameTooShort);
        }
        Ok(Self {
            op: Op::try_from(pkt[0])?,
            flags: pkt[1],
            body: &pkt[2..],
        })
    }
}

/// Encode a frame with clear flags.
pub fn encode(op: Op, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + body.len());
    out.push(op as u8);
    out.push(0);
    out.extend_from_slice(body);
    out
}
