pub mod chat;
pub mod interaction;
