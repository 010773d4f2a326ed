pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod global;
pub mod indicator;
pub mod presence;
pub mod session;
pub mod summary;
pub mod transcript;
pub mod workers;
