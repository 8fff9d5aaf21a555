pub mod cli;
pub mod config;
pub mod error;
pub mod playlist;
pub mod resolver;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
