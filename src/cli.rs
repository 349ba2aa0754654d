//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// gagstock - GrowAGarden stock reporter and weather relay
///
/// Polls the GrowAGarden shop and weather APIs, renders a stock report
/// for chat, and serves normalized weather JSON over HTTP.
///
/// Examples:
///   gagstock stock
///   gagstock stock --json --partial
///   gagstock weather --traverse-arrays
///   gagstock serve --bind 127.0.0.1:8080
///   gagstock init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gagstock.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true, env = "GAGSTOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Upstream request timeout in seconds
    ///
    /// Without it a stalled upstream stalls the whole request.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Render the categories that succeeded instead of failing on the first error
    #[arg(long, global = true)]
    pub partial: bool,

    /// Also rewrite timestamped records nested inside arrays
    #[arg(long, global = true)]
    pub traverse_arrays: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch all stock categories and print the report
    Stock {
        /// Print the aggregated JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Fetch and print the normalized weather document
    Weather,

    /// Serve GET /api/GetWeather
    Serve {
        /// Listen address (default from config, 0.0.0.0:3000)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Generate a default .gagstock.toml configuration file
    InitConfig,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run; `stock` when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Stock { json: false })
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            command: None,
            config: None,
            verbose: false,
            quiet: false,
            timeout: None,
            partial: false,
            traverse_arrays: false,
        }
    }

    #[test]
    fn test_default_command_is_stock() {
        let args = make_args();
        assert_eq!(args.command(), Command::Stock { json: false });
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["gagstock", "serve", "--bind", "127.0.0.1:9000"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Serve {
                bind: Some("127.0.0.1:9000".parse().unwrap())
            })
        );

        let args = Args::try_parse_from(["gagstock", "stock", "--json", "--partial"]).unwrap();
        assert_eq!(args.command, Some(Command::Stock { json: true }));
        assert!(args.partial);

        let args = Args::try_parse_from(["gagstock", "weather", "--traverse-arrays"]).unwrap();
        assert_eq!(args.command, Some(Command::Weather));
        assert!(args.traverse_arrays);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        args.timeout = Some(10);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_config() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("/nonexistent/.gagstock.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
