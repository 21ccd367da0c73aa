//! Demo credential handshake.
//!
//! ```text
//! embedded:   Init ──request──▶ AwaitingCredentials ──reply / timeout──▶ Ready
//! standalone: Init ────────────────────────────────────────────────────▶ Ready
//! ```
//!
//! The wait is a single-resolution oneshot raced against a timer. Timing
//! out, failing to post the request, losing the channel, or receiving
//! credentials that don't decode all resolve to the fallback credentials.
//! `Ready` is terminal; a listener keeps draining inbound messages and
//! publishes credentials that arrive late through a watch channel.

use std::time::Duration;

use taskflow_core::DemoCredentials;
use taskflow_settings::EmbedSettings;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::channel::{HostLink, PERMISSIVE_ORIGIN};
use crate::errors::EmbedError;
use crate::protocol::{InboundMessage, OutboundMessage};

/// Handshake progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent yet.
    Init,
    /// Request posted, waiting for the host.
    AwaitingCredentials,
    /// Credentials settled.
    Ready(CredentialSource),
}

/// Where the session credentials came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// The host answered in time.
    Host,
    /// Running outside a host page.
    Standalone,
    /// Embedded, but the host's answer was unusable.
    Fallback(EmbedError),
}

type Reply = Result<DemoCredentials, EmbedError>;

/// Runs the handshake once.
pub struct CredentialHandshake {
    timeout: Duration,
    fallback: DemoCredentials,
    state: watch::Sender<HandshakeState>,
}

impl CredentialHandshake {
    /// Handshake with an explicit timeout and fallback.
    pub fn new(timeout: Duration, fallback: DemoCredentials) -> Self {
        let (state, _) = watch::channel(HandshakeState::Init);
        Self {
            timeout,
            fallback,
            state,
        }
    }

    /// Handshake configured from settings.
    pub fn from_settings(settings: &EmbedSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.handshake_timeout_ms),
            settings.fallback_credentials.clone(),
        )
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<HandshakeState> {
        self.state.subscribe()
    }

    /// Settle on the fallback credentials without talking to anyone.
    pub fn standalone(self) -> SessionCredentials {
        let (_, current) = watch::channel(self.fallback);
        let _ = self
            .state
            .send_replace(HandshakeState::Ready(CredentialSource::Standalone));
        debug!("standalone mode, using fallback credentials");
        SessionCredentials {
            current,
            source: CredentialSource::Standalone,
            listener: None,
        }
    }

    /// Request credentials from the host and wait for the answer.
    pub async fn run(self, link: HostLink) -> SessionCredentials {
        let HostLink { outbound, inbound } = link;
        let (current_tx, current_rx) = watch::channel(self.fallback.clone());
        let (reply_tx, reply_rx) = oneshot::channel::<Reply>();

        let listener = tokio::spawn(listen(inbound, reply_tx, current_tx));
        let _ = self.state.send_replace(HandshakeState::AwaitingCredentials);

        let source = match outbound
            .post(&OutboundMessage::request_credentials(), PERMISSIVE_ORIGIN)
            .await
        {
            Err(e) => CredentialSource::Fallback(e),
            Ok(()) => match tokio::time::timeout(self.timeout, reply_rx).await {
                Ok(Ok(Ok(_))) => CredentialSource::Host,
                Ok(Ok(Err(e))) => CredentialSource::Fallback(e),
                Ok(Err(_)) => CredentialSource::Fallback(EmbedError::ChannelClosed),
                Err(_) => CredentialSource::Fallback(EmbedError::Timeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            },
        };

        match source {
            CredentialSource::Fallback(ref reason) => {
                warn!(reason = %reason, user = %self.fallback.user.name, "using fallback credentials");
            }
            _ => {
                info!(user = %current_rx.borrow().user.name, "received credentials from host");
            }
        }
        let _ = self.state.send_replace(HandshakeState::Ready(source.clone()));

        SessionCredentials {
            current: current_rx,
            source,
            listener: Some(listener),
        }
    }
}

/// Drain inbound messages for the lifetime of the link.
///
/// The first credentials message (or malformed one) resolves the pending
/// reply. Later credentials replace the published value.
async fn listen(
    mut inbound: mpsc::UnboundedReceiver<serde_json::Value>,
    reply: oneshot::Sender<Reply>,
    current: watch::Sender<DemoCredentials>,
) {
    let mut reply = Some(reply);
    while let Some(raw) = inbound.recv().await {
        match InboundMessage::parse(&raw) {
            Ok(InboundMessage::DemoCredentials(credentials)) => {
                let _ = current.send_replace(credentials.clone());
                match reply.take() {
                    Some(tx) => {
                        if tx.send(Ok(credentials)).is_err() {
                            info!("late credentials from host applied");
                        }
                    }
                    None => info!("updated credentials from host applied"),
                }
            }
            Ok(InboundMessage::Other(kind)) => {
                debug!(message_type = %kind, "ignoring host message");
            }
            Err(e) => match reply.take() {
                Some(tx) => {
                    let _ = tx.send(Err(e));
                }
                None => warn!(error = %e, "ignoring malformed host message"),
            },
        }
    }
    debug!("host inbound channel closed");
}

/// Credentials for the session.
///
/// The value can change after the handshake if the host answers late.
pub struct SessionCredentials {
    current: watch::Receiver<DemoCredentials>,
    source: CredentialSource,
    listener: Option<JoinHandle<()>>,
}

impl SessionCredentials {
    /// Snapshot of the current credentials.
    pub fn current(&self) -> DemoCredentials {
        self.current.borrow().clone()
    }

    /// A receiver that observes late updates.
    pub fn subscribe(&self) -> watch::Receiver<DemoCredentials> {
        self.current.clone()
    }

    /// How the handshake resolved.
    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Whether fallback credentials are in use.
    pub fn is_fallback(&self) -> bool {
        !matches!(self.source, CredentialSource::Host)
    }
}

impl Drop for SessionCredentials {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn handshake() -> CredentialHandshake {
        CredentialHandshake::from_settings(&EmbedSettings::default())
    }

    fn credentials_message(id: &str, name: &str) -> serde_json::Value {
        json!({
            "type": "DEMO_CREDENTIALS",
            "credentials": { "user": { "id": id, "name": name, "email": "", "role": "user" } }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn no_reply_falls_back_after_timeout() {
        let (link, mut host) = HostLink::pair();
        let start = tokio::time::Instant::now();
        let session = handshake().run(link).await;

        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(3000));
        assert!(waited < Duration::from_millis(3100));
        assert_eq!(session.current().user.name, "Demo User");
        assert_eq!(
            session.source(),
            &CredentialSource::Fallback(EmbedError::Timeout { timeout_ms: 3000 })
        );
        let request = host.recv().await.unwrap();
        assert_eq!(request.message.message_type(), "REQUEST_DEMO_CREDENTIALS");
        assert_eq!(request.target_origin, "*");
    }

    #[tokio::test(start_paused = true)]
    async fn reply_before_timeout_wins() {
        let (link, mut host) = HostLink::pair();
        let hs = handshake();
        let mut state = hs.state();
        let run = tokio::spawn(hs.run(link));

        let _ = host.recv().await.unwrap();
        assert_eq!(*state.borrow_and_update(), HandshakeState::AwaitingCredentials);
        assert!(host.send(json!({ "type": "SOMETHING_ELSE" })));
        assert!(host.send(credentials_message("u-9", "Grace")));

        let session = run.await.unwrap();
        assert_eq!(session.source(), &CredentialSource::Host);
        assert!(!session.is_fallback());
        assert_eq!(session.current().user.id, "u-9");
        assert_eq!(
            *state.borrow(),
            HandshakeState::Ready(CredentialSource::Host)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn late_credentials_update_the_session() {
        let (link, host) = HostLink::pair();
        let session = handshake().run(link).await;
        assert!(session.is_fallback());

        let mut updates = session.subscribe();
        assert!(host.send(credentials_message("u-late", "Late Larry")));
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().user.id, "u-late");
        assert_eq!(session.current().user.name, "Late Larry");
        // Ready is terminal
        assert!(session.is_fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_reply_falls_back_immediately() {
        let (link, host) = HostLink::pair();
        assert!(host.send(json!({ "type": "DEMO_CREDENTIALS", "credentials": 7 })));
        let start = tokio::time::Instant::now();
        let session = handshake().run(link).await;
        assert!(start.elapsed() < Duration::from_millis(3000));
        assert_matches!(
            session.source(),
            CredentialSource::Fallback(EmbedError::Malformed(_))
        );
        assert_eq!(session.current(), DemoCredentials::fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_falls_back() {
        let (link, host) = HostLink::pair();
        drop(host);
        let session = handshake().run(link).await;
        assert_matches!(session.source(), CredentialSource::Fallback(EmbedError::Post(_)));
        assert_eq!(session.current().user.name, "Demo User");
    }

    #[tokio::test(start_paused = true)]
    async fn inbound_closed_while_waiting() {
        let (link, mut host) = HostLink::pair();
        let HostLink { outbound, inbound } = link;
        // only the inbound direction is gone
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        drop(dead_tx);
        drop(inbound);
        let session = handshake().run(HostLink::new(outbound, dead_rx)).await;
        assert_eq!(
            session.source(),
            &CredentialSource::Fallback(EmbedError::ChannelClosed)
        );
        assert!(host.try_recv().is_some());
    }

    #[tokio::test]
    async fn standalone_uses_fallback() {
        let hs = handshake();
        let state = hs.state();
        let session = hs.standalone();
        assert_eq!(session.source(), &CredentialSource::Standalone);
        assert_eq!(session.current(), DemoCredentials::fallback());
        assert_eq!(
            *state.borrow(),
            HandshakeState::Ready(CredentialSource::Standalone)
        );
    }
}
