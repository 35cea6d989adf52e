//! vitrine CLI - storefront server and operations tooling
//!
//! Entry point for the `vitrine` binary:
//! - `serve` runs the storefront HTTP API
//! - `migrate` applies the database schema and exits
//! - `completions` generates shell completions

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod tracing_setup;

use commands::migrate::{run_migrate, MigrateArgs};
use commands::serve::{run_serve, ServeArgs};
use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "vitrine",
    author,
    version,
    about = "Storefront backend for digital products",
    long_about = "HTTP API for the Vitrine storefront: public catalog, checkout and \
                  order management, review moderation, and the administrative back-office."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the storefront HTTP server
    Serve(ServeArgs),

    /// Apply database migrations and exit
    Migrate(MigrateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Migrate(args) => run_migrate(args).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve() {
        let cli = Cli::try_parse_from(["vitrine", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind.unwrap().port(), 8080);
                assert!(!args.cors_permissive);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn cli_parses_migrate() {
        let cli = Cli::try_parse_from(["vitrine", "--debug", "migrate"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Migrate(_)));
    }
}
