//! CLI argument parsing for blog-neta.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Blog idea generator for software engineers
///
/// Reads Qiita trends, proposes topic categories and streams blog ideas.
#[derive(Parser, Debug)]
#[command(name = "blog-neta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/blog-neta/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show tag trends from popular Qiita articles
    Trends {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate topic categories from current trends
    Topics {
        /// Number of categories to request
        #[arg(short = 'n', long, default_value_t = 8, value_parser = parse_count)]
        count: usize,

        /// Append a custom topic to the generated catalog
        #[arg(long)]
        custom: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stream blog ideas for a topic
    Ideas {
        /// Topic name
        topic: String,

        /// Keywords to research (defaults to the topic name)
        #[arg(short, long, num_args = 1..)]
        keywords: Vec<String>,
    },

    /// Run a search adapter and print the formatted results
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },

    /// Pick topics and get ideas in a line-driven session
    Interactive {
        /// Number of categories to request per shuffle
        #[arg(short = 'n', long, default_value_t = 8, value_parser = parse_count)]
        count: usize,
    },
}

/// Category count; at least one must be requested.
fn parse_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Search backends
#[derive(Subcommand, Debug)]
pub enum SearchCommands {
    /// Web search (Google, failing over to Tavily)
    Web {
        query: String,

        #[arg(long, default_value_t = 10)]
        num: u32,
    },

    /// Tavily search with answer summary
    Tavily {
        query: String,

        #[arg(long, default_value_t = 5)]
        num: u32,

        /// Use advanced search depth
        #[arg(long)]
        advanced: bool,
    },

    /// Qiita keyword search
    Qiita {
        query: String,

        #[arg(long, default_value_t = 10)]
        num: u32,
    },
}
