//! Registry storage, the merge state machine, TTL expiry and snapshot
//! persistence: everything the stream and mailbox workers in
//! `alertsd-server` need that isn't the bus or the wire protocol itself.

pub mod merge;
pub mod persistence;
pub mod registry;
pub mod ttl;

pub use merge::{ingest, record_sent, MergeOutcome};
pub use persistence::{load, save, PersistenceError};
pub use registry::{Registry, RegistryInner};
pub use ttl::{clear_lifetime, set_lifetime, sweep};
