//! Error types for the arena
//!
//! Searching and move generation never fail; errors only come from the outer
//! layers: reading configuration, building thread pools, parsing user input.

use thiserror::Error;

/// Errors that can occur outside of the pure game rules.
#[derive(Error, Debug)]
pub enum ArenaError {
    /// Reading a config file or talking to the terminal failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for `ArenaConfig`
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but holds values the games cannot use
    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    /// The rayon pool for the parallel root split could not be created
    #[error("Failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Game name not recognised
    #[error("Unknown game: {name}")]
    UnknownGame { name: String },

    /// User typed a move the game cannot parse
    #[error("Cannot parse move '{input}': {reason}")]
    MoveParse { input: String, reason: String },

    /// Move parsed but is not in the legal move set
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: String },

    /// The search had nothing to return
    #[error("AI search failed: {message}")]
    Search { message: String },

    /// The AI worker thread went away
    #[error("AI worker disconnected")]
    WorkerDisconnected,
}

/// Result type alias for arena operations
pub type Result<T> = std::result::Result<T, ArenaError>;
