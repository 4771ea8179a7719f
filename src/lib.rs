pub mod args;
pub mod backup;
pub mod calendar;
pub mod commands;
mod config;
mod delimited;
mod error;
pub mod model;
pub mod report;
pub mod schedule;
pub mod store;
pub mod summary;
pub mod tracker;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
