//! gigmap: command-line companion for the Gigmap marketplace client.
//!
//! Exposes the client's pure rules (distance, presence, expiry countdowns,
//! photo cropping) and the geocoding bridge for scripting and support work.

use clap::{Parser, Subcommand};
use gigmap_core::config::Config;
use gigmap_telemetry::TelemetryConfig;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{crop, distance, expiry, geocode, presence};

/// Gigmap marketplace tools
#[derive(Parser)]
#[command(name = "gigmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a gigmap.toml (searched in the usual places when omitted)
    #[arg(short, long, global = true, env = "GIGMAP_CONFIG")]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance between two positions, as shown on a listing card
    Distance {
        /// Viewer latitude
        #[arg(allow_hyphen_values = true)]
        lat1: String,
        /// Viewer longitude
        #[arg(allow_hyphen_values = true)]
        lon1: String,
        /// Listing latitude
        #[arg(allow_hyphen_values = true)]
        lat2: String,
        /// Listing longitude
        #[arg(allow_hyphen_values = true)]
        lon2: String,
    },

    /// Decide whether a user shows as online
    Presence {
        /// User being looked at
        #[arg(long)]
        target: String,

        /// Signed-in viewer
        #[arg(long)]
        viewer: Option<String>,

        /// Stored online flag
        #[arg(long)]
        online: Option<bool>,

        /// Stored last-seen time (RFC 3339)
        #[arg(long)]
        last_seen: Option<String>,

        /// Evaluate at this time instead of now (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },

    /// Render a listing expiry countdown
    Expiry {
        /// Expiry time (RFC 3339); omit for a listing without one
        at: Option<String>,

        /// Evaluate at this time instead of now (RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// Keep ticking until the listing expires
        #[arg(long)]
        watch: bool,
    },

    /// Crop a photo to the square profile output
    Crop {
        /// Source image
        input: PathBuf,

        /// Where to write the JPEG
        output: PathBuf,

        /// Horizontal pan in UI pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f64,

        /// Vertical pan in UI pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f64,

        /// Zoom (clamped to 0.5..=3)
        #[arg(long, default_value = "1")]
        scale: f64,

        /// Side of the on-screen crop viewport in UI pixels
        #[arg(long, default_value = "250")]
        ui_size: f64,
    },

    /// Resolve places through the geocoding bridge
    Geocode {
        #[command(subcommand)]
        action: GeocodeAction,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum GeocodeAction {
    /// Address for a position
    Reverse {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },

    /// Place suggestions for partial input
    Autocomplete {
        /// Text typed so far
        query: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Load and validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return exit_code(&anyhow::Error::new(e));
        }
    };

    let telemetry = TelemetryConfig::from(&config.schema.logging).with_verbosity(cli.verbose);
    if let Err(e) = gigmap_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let result = match cli.command {
        Commands::Distance { lat1, lon1, lat2, lon2 } => {
            distance::run(&lat1, &lon1, &lat2, &lon2, &cli.format)
        }

        Commands::Presence { target, viewer, online, last_seen, now } => presence::run(
            &config,
            &presence::Args {
                target,
                viewer,
                online,
                last_seen,
                now,
            },
            &cli.format,
        ),

        Commands::Expiry { at, now, watch } => {
            if watch {
                expiry::watch(&config, at.as_deref()).await
            } else {
                expiry::run(&config, at.as_deref(), now.as_deref(), &cli.format)
            }
        }

        Commands::Crop { input, output, x, y, scale, ui_size } => crop::run(
            &config,
            &crop::Args {
                input,
                output,
                x,
                y,
                scale,
                ui_size,
            },
            &cli.format,
        ),

        Commands::Geocode { action } => match action {
            GeocodeAction::Reverse { lat, lon } => geocode::reverse(&config, lat, lon, &cli.format).await,
            GeocodeAction::Autocomplete { query } => {
                geocode::autocomplete(&config, &query, &cli.format).await
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Validate => commands::config::validate(&config, &cli.format),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code(&e)
        }
    }
}

/// Map a failure onto the documented exit codes.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    use gigmap_core::error::exit_codes;

    let code = if let Some(core) = err.downcast_ref::<gigmap_core::Error>() {
        match core.code.category() {
            "Configuration" => exit_codes::CONFIG_ERROR,
            "Validation" => exit_codes::VALIDATION_ERROR,
            "Permission" => exit_codes::PERMISSION_ERROR,
            "Network" => exit_codes::NETWORK_ERROR,
            _ => exit_codes::FAILURE,
        }
    } else if err.downcast_ref::<gigmap_api_client::ApiError>().is_some() {
        exit_codes::NETWORK_ERROR
    } else {
        exit_codes::FAILURE
    };

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
