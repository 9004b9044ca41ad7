pub mod canonical;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod fs;
pub mod hashing;
pub mod logging;
pub mod record;
pub mod reporter;
pub mod revision;
pub mod selector;
