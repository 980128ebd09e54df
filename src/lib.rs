pub mod actions;
pub mod client;
pub mod config;
pub mod sync;
pub mod tracker;
pub mod types;

pub use config::Config;
pub use types::*;
