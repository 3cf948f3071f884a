pub mod config;
pub mod error;
pub mod ports;
pub mod query;
pub mod time;
pub mod types;

pub use error::{Error, Result};
