pub mod auth;
pub mod chat;
pub mod members;
pub mod user;
pub mod visibility;
