//! # wsc-enrollee
//!
//! The Enrollee role of EAP-WSC (Wi-Fi Simple Configuration 2.0.5): an
//! authentication method run inside an EAP conversation that obtains
//! network credentials from a Registrar.
//!
//! The state machine is purely reactive. Each inbound frame is handed to
//! [`session::Enrollee::handle_request`], which returns the frames to
//! transmit and, on completion, the extracted credentials together with
//! the exported key material. [`method::WscMethod`] adapts that event
//! stream to the outer EAP engine's transport and result channels.

pub mod authenticator;
pub mod encrypted;
pub mod method;
pub mod session;
pub mod settings;
pub mod traits;

pub use method::WscMethod;
pub use session::{Completion, Enrollee, Event, State};
pub use settings::EnrolleeSettings;
