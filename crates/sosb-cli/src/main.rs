mod auth;
mod brands;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthCommands;
use crate::brands::BrandsCommands;
use crate::report::ReportArgs;

#[derive(Debug, Parser)]
#[command(name = "sosb-cli")]
#[command(about = "Share-of-search command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute share of search for the configured brands
    Report(ReportArgs),
    /// Inspect the brand registry
    Brands {
        #[command(subcommand)]
        command: BrandsCommands,
    },
    /// Google Ads OAuth setup
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = sosb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so report output on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Report(args)) => report::run_report(config, &args).await?,
        Some(Commands::Brands {
            command: BrandsCommands::Check { brands },
        }) => brands::run_brands_check(&config, brands.as_deref())?,
        Some(Commands::Auth {
            command: AuthCommands::Url { redirect_uri },
        }) => auth::run_auth_url(&config, &redirect_uri)?,
        Some(Commands::Auth {
            command:
                AuthCommands::Exchange {
                    code,
                    env_file,
                    redirect_uri,
                },
        }) => auth::run_auth_exchange(&config, &code, &env_file, &redirect_uri).await?,
        None => println!("sosb-cli ready; run `sosb-cli --help` for commands"),
    }

    Ok(())
}
