use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "lumis-cli", version, about = "Lumis CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Light tracking control
    Track {
        #[command(subcommand)]
        action: commands::track::TrackAction,
    },
    /// Daily goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Blocked-app management
    Apps {
        #[command(subcommand)]
        action: commands::apps::AppsAction,
    },
    /// Shield status and sync
    Shield {
        #[command(subcommand)]
        action: commands::shield::ShieldAction,
    },
    /// Emergency flares and skip passes
    Passes {
        #[command(subcommand)]
        action: commands::passes::PassesAction,
    },
    /// Lux calibration
    Calibrate {
        #[command(subcommand)]
        action: commands::calibrate::CalibrateAction,
    },
    /// Fire scheduled reminders
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Progress statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Backend synchronization
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Track { action } => commands::track::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Apps { action } => commands::apps::run(action),
        Commands::Shield { action } => commands::shield::run(action),
        Commands::Passes { action } => commands::passes::run(action),
        Commands::Calibrate { action } => commands::calibrate::run(action),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Sync { action } => commands::sync::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
