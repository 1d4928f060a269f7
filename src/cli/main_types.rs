use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "connect-audit")]
#[command(about = "Inventory and review tool for Amazon Connect instances")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// AWS region, overriding the configured profile
    #[arg(short, long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect and review the Connect inventory of a region
    Review {
        /// Write the snapshot to a JSON file after rendering
        #[arg(long)]
        export_json: bool,
        /// Output path for the exported snapshot (defaults to a timestamped name)
        #[arg(long, short)]
        output: Option<String>,
        /// Number of instances collected concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key (region, aws_profile, concurrency, timeout_seconds)
        key: String,
        /// Configuration value
        value: String,
    },
}
