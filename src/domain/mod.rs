pub mod field;
pub mod session;
pub mod ticket;
pub mod update;
pub mod validation;
