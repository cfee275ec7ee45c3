//! blog-neta command-line library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (trends, topics, ideas, search, interactive)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, SearchCommands};
pub use commands::{
    init, propose_ideas, render_catalog, render_signal, run_interactive, run_search, show_topics,
    show_trends, App,
};
