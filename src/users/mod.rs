pub mod gate;
pub mod session;
pub mod store;
pub mod user;
pub mod users;
pub mod validation;
