//! Medhist - console client for the hospital medical-records API
//!
//! The binary parses a [`Cli`], builds an [`App`] from [`ClientConfig`]
//! and hands the command to [`run`].
//!
//! [`ClientConfig`]: medhist_infrastructure::ClientConfig

pub mod cli;
pub mod commands;
pub mod context;

pub use cli::{Cli, Command};
pub use commands::run;
pub use context::App;
