//! Message-bus seam for `alertsd`: a pair of traits (`AlertStream` for
//! pub/sub, `Mailbox` for point-to-point request/reply) that the rest of
//! the workspace programs against, plus an in-process implementation
//! used by the binary and by integration tests. A real transport can
//! implement the same traits without the workers changing.

mod control;
mod error;
mod mailbox;
mod stream;

pub use control::{ControlChannel, ControlMessage};
pub use error::BusError;
pub use mailbox::{call, channel as mailbox_channel, InProcessMailbox, Mailbox, MailboxEnvelope, MailboxRequest, MailboxReply};
pub use stream::{encode_and_publish, AlertStream, InProcessBus, StreamMessage, StreamSubscription};
