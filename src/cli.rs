//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// geoguard - visitor geolocation and protected image server
#[derive(Parser, Debug)]
#[command(name = "geoguard")]
#[command(version)]
#[command(about = "Visitor geolocation lookup and session-gated image serving", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./config.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the geo-lookup server (default)
    #[cfg(feature = "geo")]
    Geo,

    /// Run the protected-image server
    #[cfg(feature = "image")]
    Image,

    /// Print a signed session token for the image server
    #[cfg(feature = "image")]
    SessionToken {
        /// Subject recorded in the token
        #[arg(long, default_value = "operator")]
        subject: String,

        /// Lifetime in minutes (default: session.ttl_minutes)
        #[arg(long)]
        minutes: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite
        #[arg(long)]
        force: bool,
    },
}
