pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig, HistoryConfig, PageConfig};
pub use loader::load_config;
