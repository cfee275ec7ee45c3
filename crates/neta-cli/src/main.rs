//! blog-neta
//!
//! Proposes blog ideas for software engineers from Qiita trends.
//!
//! # Usage
//!
//! ```bash
//! blog-neta trends [--json]
//! blog-neta topics [--count N] [--custom NAME] [--json]
//! blog-neta ideas <TOPIC> [--keywords K...]
//! blog-neta search web|tavily|qiita <QUERY> [--num N] [--advanced]
//! blog-neta interactive
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/blog-neta/config.toml)
//! 3. Environment variables (NETA_*, then vendor keys such as ANTHROPIC_API_KEY)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use neta_cli::{
    init, propose_ideas, run_interactive, run_search, show_topics, show_trends, App, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = init(cli.config.as_deref(), cli.log_level.as_deref())?;
    let app = App::new(settings)?;

    match cli.command {
        Commands::Trends { json } => {
            show_trends(&app, json).await?;
        }
        Commands::Topics {
            count,
            custom,
            json,
        } => {
            show_topics(&app, count, custom.as_deref(), json).await?;
        }
        Commands::Ideas { topic, keywords } => {
            propose_ideas(&app, &topic, &keywords).await?;
        }
        Commands::Search { command } => {
            run_search(&app, command).await?;
        }
        Commands::Interactive { count } => {
            run_interactive(&app, count).await?;
        }
    }

    Ok(())
}
