//! Runtime abstraction for the few system operations the CLI performs.
//!
//! Commands and configuration resolution go through [`Runtime`] instead of
//! touching `std::env` or `std::fs` directly, so tests can substitute
//! [`MockRuntime`].
//!
//! - `env` - Environment variables
//! - `fs` - Reading input files (bodies, JSON metadata)

mod env;
mod fs;

use anyhow::Result;
use std::env as std_env;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }
}
