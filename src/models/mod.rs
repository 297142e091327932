pub mod membership;
pub mod message;
pub mod notification;
pub mod user;

pub use membership::*;
pub use message::*;
pub use notification::*;
pub use user::*;
