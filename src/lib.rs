//! # Redis Server Library

pub mod cli;
pub mod cmd;
pub mod conn;
pub mod constants;
pub mod errors;
pub mod expiry;
#[macro_use]
pub mod macros;
pub mod resp;
pub mod server;
pub mod store;
pub mod types;
