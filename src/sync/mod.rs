pub mod client;
pub mod state;

pub use client::{ChatSyncClient, MessageLoad, SendOutcome};
pub use state::{ChatState, MessageTicket};
