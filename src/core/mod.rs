pub mod config;
pub mod error;

pub use config::DdaConfig;
pub use error::{DdaError, Result};
