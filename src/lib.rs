pub mod cache;
pub mod config;
pub mod error;
pub mod routes;
pub mod utils;
pub mod validate;
pub mod weather;
