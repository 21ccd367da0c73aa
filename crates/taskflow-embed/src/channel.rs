//! Transport between TaskFlow and its host page.
//!
//! Outbound messages go through a [`HostChannel`]; inbound messages arrive as
//! raw JSON on an unbounded receiver. [`HostLink::pair`] wires both directions
//! in-process, which is what tests and single-process hosts use.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::errors::{EmbedError, Result};
use crate::protocol::OutboundMessage;

/// Target origin for every outbound message.
///
/// The host is not authenticated; any origin may receive the messages.
pub const PERMISSIVE_ORIGIN: &str = "*";

/// Outbound half of the host connection.
#[async_trait]
pub trait HostChannel: Send + Sync {
    /// Post a message to the host.
    async fn post(&self, message: &OutboundMessage, target_origin: &str) -> Result<()>;
}

/// A message as the host received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostedMessage {
    /// The message.
    pub message: OutboundMessage,
    /// Origin it was addressed to.
    pub target_origin: String,
}

/// [`HostChannel`] backed by a tokio channel.
#[derive(Clone)]
pub struct MpscHostChannel {
    tx: mpsc::UnboundedSender<PostedMessage>,
}

#[async_trait]
impl HostChannel for MpscHostChannel {
    async fn post(&self, message: &OutboundMessage, target_origin: &str) -> Result<()> {
        self.tx
            .send(PostedMessage {
                message: message.clone(),
                target_origin: target_origin.to_owned(),
            })
            .map_err(|_| EmbedError::Post("host is not listening".to_owned()))
    }
}

/// TaskFlow's end of the host connection.
pub struct HostLink {
    /// Outbound channel.
    pub outbound: Arc<dyn HostChannel>,
    /// Raw inbound messages.
    pub inbound: mpsc::UnboundedReceiver<Value>,
}

impl HostLink {
    /// Link over an arbitrary outbound channel.
    pub fn new(outbound: Arc<dyn HostChannel>, inbound: mpsc::UnboundedReceiver<Value>) -> Self {
        Self { outbound, inbound }
    }

    /// In-process link plus the host's end of it.
    pub fn pair() -> (Self, HostEnd) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let link = Self::new(Arc::new(MpscHostChannel { tx: out_tx }), in_rx);
        let host = HostEnd {
            received: out_rx,
            sender: in_tx,
        };
        (link, host)
    }
}

/// The host page's end of an in-process link.
pub struct HostEnd {
    received: mpsc::UnboundedReceiver<PostedMessage>,
    sender: mpsc::UnboundedSender<Value>,
}

impl HostEnd {
    /// Deliver a raw message to TaskFlow. Returns `false` once TaskFlow has
    /// stopped listening.
    pub fn send(&self, message: Value) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Next message TaskFlow posted, waiting for one.
    pub async fn recv(&mut self) -> Option<PostedMessage> {
        self.received.recv().await
    }

    /// Next message TaskFlow posted, if one is already queued.
    pub fn try_recv(&mut self) -> Option<PostedMessage> {
        self.received.try_recv().ok()
    }

    /// Every queued message, oldest first.
    pub fn drain(&mut self) -> Vec<PostedMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Close the outbound direction so further posts fail.
    pub fn close_outbound(&mut self) {
        self.received.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn pair_delivers_both_ways() {
        let (mut link, mut host) = HostLink::pair();
        link.outbound
            .post(&OutboundMessage::error("boom"), PERMISSIVE_ORIGIN)
            .await
            .unwrap();
        let posted = host.recv().await.unwrap();
        assert_eq!(posted.target_origin, "*");
        assert_eq!(posted.message.message_type(), "TASKFLOW_ERROR");

        assert!(host.send(json!({ "type": "PING" })));
        assert_eq!(link.inbound.recv().await.unwrap()["type"], "PING");
    }

    #[tokio::test]
    async fn post_fails_when_host_stops_listening() {
        let (link, mut host) = HostLink::pair();
        host.close_outbound();
        let err = link
            .outbound
            .post(&OutboundMessage::request_credentials(), PERMISSIVE_ORIGIN)
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::Post(_)));
    }

    #[tokio::test]
    async fn send_fails_after_link_dropped() {
        let (link, host) = HostLink::pair();
        drop(link);
        assert!(!host.send(json!({ "type": "PING" })));
    }
}
