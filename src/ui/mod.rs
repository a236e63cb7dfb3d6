pub mod app;
pub mod components;
pub mod state;
pub mod view;

pub use app::ChatApp;
