pub mod config;
pub mod draft;
pub mod serve;
pub mod validate;
