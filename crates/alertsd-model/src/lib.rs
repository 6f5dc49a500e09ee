//! Data model shared by every `alertsd` crate: the canonical `Alert`
//! record, its identity and state vocabularies, and the wire codec used
//! to move an `Alert` across the message bus or into a snapshot file.

mod alert;
pub mod codec;
mod identity;
mod state;
pub mod zbytes;

pub use alert::Alert;
pub use codec::{decode, encode, CodecError};
pub use identity::AlertIdentity;
pub use state::{
    is_acknowledge_state, is_alert_state, AcknowledgeRequestState, AlertState,
    ListRequestState,
};
