pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::*;
pub use error::*;
pub use retry::*;
pub use types::*;
