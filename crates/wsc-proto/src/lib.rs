//! # wsc-proto
//!
//! Wire codec for Wi-Fi Simple Configuration: the 16-bit TLV attribute
//! format, the registration protocol messages (M1..M8, NACK, DONE) and
//! the 2-byte EAP-WSC operation framing. ACK and FRAG_ACK exist only as
//! opcodes ([`frame::Op`]); they carry no message body the Enrollee
//! consumes.

pub mod attr;
pub mod device;
pub mod frame;
pub mod msg;
pub mod uuid;

pub use attr::{AttrWriter, Attrs};
pub use frame::{Frame, Op};
pub use msg::Message;
