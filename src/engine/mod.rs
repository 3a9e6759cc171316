pub mod commands;
pub mod config;
pub mod history;
pub mod models;
pub mod queue;
pub mod scoring;
pub mod session;
