pub mod api;
pub mod http;
pub mod mock;
pub mod worker;

pub use api::ChatApi;
pub use http::HttpChatApi;
pub use mock::MockChatApi;
pub use worker::SyncWorker;
