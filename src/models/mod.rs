mod chat;
mod task;
mod user;

pub use chat::*;
pub use task::*;
pub use user::*;
