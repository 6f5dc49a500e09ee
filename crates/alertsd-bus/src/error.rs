use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("mailbox subject {0} has no worker listening")]
    Disconnected(String),
    #[error("mailbox reply channel closed before a reply arrived")]
    ReplyDropped,
    #[error("control channel closed")]
    ControlClosed,
}
