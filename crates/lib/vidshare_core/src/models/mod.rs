//! Domain models shared by the store, auth and API layers.

pub mod auth;
pub mod channel;
pub mod user;
