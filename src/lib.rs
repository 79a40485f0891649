pub mod cli;
pub mod config;
pub mod integrations;
pub mod logging;
pub mod policy;
pub mod seed;
pub mod server;
