//! The pub/sub half of the bus: ingress and egress are the same wire
//! shape, so a single broadcast channel pair serves both directions
//! (publishing on it is "egress", subscribing to it is "ingress").

use crate::error::BusError;
use alertsd_model::Alert;
use tokio::sync::broadcast;

/// Subject plus wire-encoded alert, exactly what crosses the bus.
pub type StreamMessage = (String, Vec<u8>);

/// The seam the stream worker and mailbox worker publish through and the
/// stream worker subscribes to. A real transport implementation sits
/// behind the same trait without the workers changing.
pub trait AlertStream: Send + Sync + std::fmt::Debug {
    fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError>;
    fn subscribe(&self) -> StreamSubscription;
}

#[derive(Debug)]
pub struct StreamSubscription {
    rx: broadcast::Receiver<StreamMessage>,
}

impl StreamSubscription {
    /// Waits for the next delivery. Returns `None` once the bus itself
    /// has been dropped. A lagging subscriber (it fell behind the
    /// broadcast capacity) logs and skips forward rather than erroring —
    /// this bus makes no delivery guarantee to a slow subscriber beyond
    /// "eventually consistent with what's still in the ring buffer".
    pub async fn recv(&mut self) -> Option<StreamMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "stream subscriber lagged, dropping messages");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The in-process bus implementation used by the server binary and by
/// tests. Broadcast capacity bounds how far a slow subscriber may lag
/// before messages are dropped for it specifically (not for others).
#[derive(Debug, Clone)]
pub struct InProcessBus {
    tx: broadcast::Sender<StreamMessage>,
}

impl InProcessBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl AlertStream for InProcessBus {
    fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        // A publish with no subscribers is not an error: this bus has no
        // durability guarantee, a message with no current listener is
        // simply dropped.
        let _ = self.tx.send((subject.to_string(), payload));
        Ok(())
    }

    fn subscribe(&self) -> StreamSubscription {
        StreamSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Convenience for callers that want to publish an already-decoded
/// alert; encoding failures are the caller's problem (they decide
/// whether to log-and-drop or propagate).
pub fn encode_and_publish(
    bus: &dyn AlertStream,
    subject: &str,
    alert: &Alert,
) -> Result<(), BusError> {
    match alertsd_model::codec::encode(alert) {
        Ok(bytes) => bus.publish(subject, bytes),
        Err(err) => {
            tracing::warn!(%err, "failed to encode alert for publish");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_is_observed_by_every_subscriber() {
        let bus = InProcessBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        bus.publish("rule/WARNING@elem", vec![1, 2, 3]).unwrap();

        assert_eq!(
            a.recv().await,
            Some(("rule/WARNING@elem".to_string(), vec![1, 2, 3]))
        );
        assert_eq!(
            b.recv().await,
            Some(("rule/WARNING@elem".to_string(), vec![1, 2, 3]))
        );
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = InProcessBus::new(8);
        assert!(bus.publish("subject", vec![9]).is_ok());
    }

    #[tokio::test]
    async fn dropping_a_subscriber_does_not_affect_others() {
        let bus = InProcessBus::new(8);
        let mut keep = bus.subscribe();
        {
            let _drop_me = bus.subscribe();
        }
        bus.publish("s", vec![7]).unwrap();
        assert_eq!(keep.recv().await, Some(("s".to_string(), vec![7])));
    }
}
