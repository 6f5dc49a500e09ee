//! The supervisor-to-worker control channel: `Term` for a cooperative
//! stop (the worker drains whatever it's doing, then exits) and
//! `TtlCleanup` to trigger an out-of-band expiry sweep on the stream
//! worker.

use crate::error::BusError;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    Term,
    TtlCleanup,
}

#[derive(Debug, Clone)]
pub struct ControlChannel {
    tx: mpsc::Sender<ControlMessage>,
}

impl ControlChannel {
    pub fn pair(capacity: usize) -> (ControlChannel, mpsc::Receiver<ControlMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (ControlChannel { tx }, rx)
    }

    pub async fn send(&self, message: ControlMessage) -> Result<(), BusError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| BusError::ControlClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn term_is_delivered() {
        let (ctl, mut rx) = ControlChannel::pair(4);
        ctl.send(ControlMessage::Term).await.unwrap();
        assert_eq!(rx.recv().await, Some(ControlMessage::Term));
    }
}
