use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "flight_focus")]
#[command(about = "Pomodoro focus sessions framed as airline flights")]
#[command(long_about = "flight_focus - Pomodoro focus sessions framed as airline flights

Pick two airports, get a great-circle route and a flight time at cruise
speed, and focus while the plane flies: 30 minute work blocks, 5 minute
breaks, all fitted inside the flight.

QUICK START:
  flight_focus route JFK LHR           Distance, heading and flight time
  flight_focus search london           Find airport codes
  flight_focus seats                   Free and taken seats
  flight_focus fly JFK LHR --snacks    Board and take off in the terminal
  flight_focus daemon                  Serve a browser UI over WebSocket")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Airport catalog (airports.json format)
    #[arg(long, global = true, env = "FLIGHT_FOCUS_AIRPORTS")]
    pub airports: Option<PathBuf>,

    /// Config file (default: ~/.config/flight_focus/config.json)
    #[arg(long, global = true, env = "FLIGHT_FOCUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show distance, initial heading and flight time between two airports
    Route {
        /// Origin IATA code
        from: String,
        /// Destination IATA code
        to: String,
    },

    /// Search airports by city or IATA code
    Search {
        /// At least two characters
        query: String,
    },

    /// Fly a focus session in the terminal (Ctrl-C aborts)
    Fly {
        /// Origin IATA code
        from: String,
        /// Destination IATA code
        to: String,
        /// Snack service on every break
        #[arg(long)]
        snacks: bool,
        /// Seat such as 3C (rows 1-12, columns A-D)
        #[arg(long)]
        seat: Option<String>,
    },

    /// Show the seat map (x marks taken seats)
    Seats,

    /// Serve the session to a browser UI over WebSocket
    Daemon {
        /// Listen address (default: 127.0.0.1:8765)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fly() {
        let cli = Cli::try_parse_from([
            "flight_focus",
            "fly",
            "JFK",
            "LHR",
            "--snacks",
            "--seat",
            "3C",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Fly {
                from,
                to,
                snacks,
                seat,
            } => {
                assert_eq!(from, "JFK");
                assert_eq!(to, "LHR");
                assert!(snacks);
                assert_eq!(seat.as_deref(), Some("3C"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_daemon_addr() {
        let cli = Cli::try_parse_from(["flight_focus", "daemon", "--addr", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Daemon { addr } => assert_eq!(addr.unwrap().port(), 9000),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_seats() {
        let cli = Cli::try_parse_from(["flight_focus", "seats"]).unwrap();
        assert!(matches!(cli.command, Commands::Seats));
    }
}
