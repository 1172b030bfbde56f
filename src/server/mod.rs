pub mod dto;
pub mod error;
pub mod http;
pub mod limit;
pub mod start;
pub mod state;

pub use start::{ServerConfig, start_server};
