//! Typed facade over the Listmonk REST API, built on the request executor.

mod client;
mod types;

pub use client::{ListmonkApi, ListmonkClient};
pub use types::*;

#[cfg(test)]
pub use client::MockListmonkApi;
