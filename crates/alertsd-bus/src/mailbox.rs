//! Point-to-point request/reply, one instance per RFC subject
//! (`rfc-alerts-list`, `rfc-alerts-acknowledge`). Modeled as an `mpsc`
//! channel carrying `(request, reply oneshot)` pairs: a request that
//! expects exactly one reply, rather than a fire-and-forget signal.
//!
//! Frames mirror a multipart message (`command, [correlation_id,]
//! state`, etc.): each frame is an opaque byte string, and the server
//! side decides how many frames it needs and in what order.

use crate::error::BusError;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxRequest(pub Vec<Vec<u8>>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxReply(pub Vec<Vec<u8>>);

impl MailboxRequest {
    pub fn frames(frames: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(frames.into_iter().map(|f| f.into().into_bytes()).collect())
    }
}

impl MailboxReply {
    pub fn frames(frames: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(frames.into_iter().map(|f| f.into().into_bytes()).collect())
    }
}

pub type MailboxEnvelope = (MailboxRequest, oneshot::Sender<MailboxReply>);

/// The client-visible half of a mailbox: enough to hand off a request
/// and a reply channel without exposing how the server side is
/// implemented. Kept sync and object-safe (`dyn Mailbox`) — the actual
/// waiting for a reply happens outside the trait via the returned
/// `oneshot::Receiver`, through the free function [`call`].
pub trait Mailbox: Send + Sync + std::fmt::Debug {
    fn try_send(
        &self,
        request: MailboxRequest,
        reply_tx: oneshot::Sender<MailboxReply>,
    ) -> Result<(), BusError>;
}

#[derive(Debug, Clone)]
pub struct InProcessMailbox {
    subject: String,
    tx: mpsc::Sender<MailboxEnvelope>,
}

impl Mailbox for InProcessMailbox {
    fn try_send(
        &self,
        request: MailboxRequest,
        reply_tx: oneshot::Sender<MailboxReply>,
    ) -> Result<(), BusError> {
        self.tx
            .try_send((request, reply_tx))
            .map_err(|_| BusError::Disconnected(self.subject.clone()))
    }
}

/// Create a mailbox's two halves: the client-facing `Mailbox` handle and
/// the server-facing receiver the mailbox worker polls in its
/// `tokio::select!` loop.
pub fn channel(subject: impl Into<String>, capacity: usize) -> (InProcessMailbox, mpsc::Receiver<MailboxEnvelope>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        InProcessMailbox {
            subject: subject.into(),
            tx,
        },
        rx,
    )
}

/// Send `request` and await exactly one reply. Convenience for tests and
/// any future client that talks to a `Mailbox` directly rather than
/// through the wire protocol.
pub async fn call(mailbox: &dyn Mailbox, request: MailboxRequest) -> Result<MailboxReply, BusError> {
    let (tx, rx) = oneshot::channel();
    mailbox.try_send(request, tx)?;
    rx.await.map_err(|_| BusError::ReplyDropped)
}
