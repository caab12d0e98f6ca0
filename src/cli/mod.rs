//! CLI commands for PureMark.
//!
//! `serve` runs the API; `list`, `search` and `open` talk to a running server.

pub mod query;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "puremark")]
#[command(about = "Search-first personal bookmark manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,

        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
    },

    /// Print all bookmarks
    List {
        /// API base URL (default from config or PUREMARK_SERVER)
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// Print the ranked results for a query
    Search {
        query: String,

        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// Open a result: record the usage and print its URL
    Open {
        query: String,

        /// Row of the result window, starting at 1
        #[arg(long, short, default_value_t = 1)]
        index: usize,

        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },
}

impl Commands {
    /// Fold command-line flags into the loaded configuration, then validate
    /// the result.
    pub fn apply_to(&self, config: &mut Config) {
        match self {
            Commands::Serve {
                host,
                port,
                database,
            } => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(database) = database {
                    config.database.path = database.clone();
                }
            }
            Commands::List { server }
            | Commands::Search { server, .. }
            | Commands::Open { server, .. } => {
                if let Some(server) = server {
                    config.client.server_url = server.clone();
                }
            }
        }
        config.validate();
    }
}

/// Run the parsed command with the given configuration.
pub async fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    cli.command.apply_to(&mut config);

    match cli.command {
        Commands::Serve { .. } => crate::server::serve(&config).await,
        Commands::List { .. } => query::run_list(&config).await,
        Commands::Search { query, .. } => query::run_search(&config, &query).await,
        Commands::Open { query, index, .. } => query::run_open(&config, &query, index).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "puremark",
            "serve",
            "--port",
            "4100",
            "--database",
            "/tmp/marks.db",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.command.apply_to(&mut config);
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.server.host, crate::config::DEFAULT_HOST);
        assert_eq!(config.database.path, PathBuf::from("/tmp/marks.db"));
    }

    #[test]
    fn test_parse_open_defaults() {
        let cli = Cli::try_parse_from([
            "puremark",
            "open",
            "docs",
            "--server",
            "http://marks.local/",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.command.apply_to(&mut config);
        assert_eq!(config.client.server_url, "http://marks.local");
        assert!(matches!(cli.command, Commands::Open { index: 1, .. }));
    }

    #[test]
    fn test_serve_flags_are_validated() {
        let cli = Cli::try_parse_from(["puremark", "serve", "--port", "0", "--host", ""]).unwrap();

        let mut config = Config::default();
        config.server.port = 8080;
        cli.command.apply_to(&mut config);
        assert_eq!(config.server.port, crate::config::DEFAULT_PORT);
        assert_eq!(config.server.host, crate::config::DEFAULT_HOST);
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["puremark", "search"]).is_err());
    }
}
