pub mod error;
pub mod password;
pub mod time;

pub use error::*;
