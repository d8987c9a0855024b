pub mod commands;
pub mod config;
pub mod http;
pub mod listmonk;
pub mod runtime;
