pub mod cars;
pub mod config;
pub mod encryption_engine;
pub mod error;
pub mod rental;
pub mod search;
pub mod server;
pub mod users;
