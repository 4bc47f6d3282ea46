//! Application-level settings shared by every catalog consumer.

pub mod config;

pub use config::Config;
