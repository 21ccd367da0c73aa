//! # taskflow-embed
//!
//! Integration with a host page when TaskFlow runs embedded.
//!
//! On startup the app asks the host for demo credentials and waits up to a
//! bounded timeout ([`handshake`]). Afterwards it reports lifecycle events
//! to the host ([`notifier`]). All messages are JSON objects tagged by
//! `type` ([`protocol`]) and travel over a [`channel::HostLink`].

#![deny(unsafe_code)]

pub mod channel;
pub mod errors;
pub mod handshake;
pub mod notifier;
pub mod protocol;

pub use channel::{HostChannel, HostEnd, HostLink, PERMISSIVE_ORIGIN, PostedMessage};
pub use errors::{EmbedError, Result};
pub use handshake::{CredentialHandshake, CredentialSource, HandshakeState, SessionCredentials};
pub use notifier::HostNotifier;
pub use protocol::{InboundMessage, OutboundMessage};
