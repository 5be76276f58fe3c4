pub mod auth;
pub mod tickets;
pub mod update;
