pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use config::PharmaqConfig;
pub use error::{PharmaqError, Result};
pub use session::Session;
pub use types::*;
