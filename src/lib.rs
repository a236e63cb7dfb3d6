//! Chat client that keeps a local view of chats and messages in step with a
//! REST backend by polling.

pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;
pub mod sync;
pub mod ui;
