use clap::Parser;
use tracing_subscriber::EnvFilter;

use flight_focus::cli::args::{Cli, Commands};
use flight_focus::cli::commands;
use flight_focus::config::Config;
use flight_focus::error::AppError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let default_filter = if cli.verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Seats = cli.command {
        commands::seats();
        return Ok(());
    }

    let catalog = commands::load_catalog(cli.airports, &config)?;

    match cli.command {
        Commands::Route { from, to } => commands::show_route(&catalog, &from, &to),
        Commands::Search { query } => commands::search(&catalog, &query),
        Commands::Fly {
            from,
            to,
            snacks,
            seat,
        } => commands::fly(&catalog, &config, &from, &to, snacks, seat).await,
        Commands::Daemon { addr } => commands::daemon(catalog, &config, addr).await,
        Commands::Seats => Ok(()),
    }
}
