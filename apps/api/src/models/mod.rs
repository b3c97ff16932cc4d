pub mod chat;
pub mod problem;
pub mod user;
