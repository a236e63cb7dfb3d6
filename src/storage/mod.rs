pub mod database;
pub mod session_store;

pub use database::Database;
pub use session_store::SessionStore;

use std::fs;
use std::path::Path;

/// Make sure the directory holding `file` exists.
pub fn ensure_parent_dir(file: &str) -> std::io::Result<()> {
    match Path::new(file).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
