//! spotmix library
//!
//! Resolves declarative playlist definitions into track lists and publishes
//! them to Spotify, on demand or on a schedule.
//!
//! # Modules
//!
//! - `api` - JSON API consumed by the web front end
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `engine` - Reference resolution, recents window, assembly and publishing
//! - `error` - Error taxonomy shared by all layers
//! - `provider` - Catalog operations the engine needs from a streaming service
//! - `runner` - Run locks, retries, run-all fan-out and the periodic trigger
//! - `server` - HTTP server bootstrap
//! - `spotify` - Spotify Web API client implementation
//! - `store` - Persistence of playlist definitions and users
//! - `types` - Data structures and type definitions
//! - `update` - Partial updates of playlist definitions
//! - `utils` - Month tokens, deduplication and uri helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod runner;
pub mod server;
pub mod spotify;
pub mod store;
pub mod types;
pub mod update;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Scheduling run-all every {} minutes.", minutes);
/// info!("{} playlists defined for {}.", count, user);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Published {} tracks to {}.", tracks, name);
/// success!("All {} playlists published.", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Cannot load environment. Err: {}", e);
/// error!("Run of {} failed: {}", name, e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("No playlists defined for {}.", user);
/// warning!("{} of {} playlists failed.", failed, total);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
