pub mod mailbox;
pub mod stream;
