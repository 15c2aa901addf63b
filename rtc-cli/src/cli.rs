use clap::{Args, Parser, Subcommand};
use rtc_access::Role;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rtc-token",
    version,
    about = "Issue and inspect access tokens for real-time channels",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

/// Application credentials, read from flags or the environment
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    /// Application identifier (32 hex characters)
    #[arg(long, env = "AGORA_APP_ID", hide_env_values = true)]
    pub app_id: Option<String>,

    /// Application certificate; without it no token is issued
    #[arg(long, env = "AGORA_APP_CERTIFICATE", hide_env_values = true)]
    pub app_certificate: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a channel token
    Issue {
        /// Channel name (uses config default if not specified)
        #[arg(short, long)]
        channel: Option<String>,

        /// Numeric uid or user account (random uid if not specified)
        #[arg(short, long)]
        uid: Option<String>,

        /// Requested role
        #[arg(short, long)]
        role: Option<Role>,

        /// Token lifetime in seconds
        #[arg(short, long)]
        expire: Option<u32>,

        /// Also decode the issued token
        #[arg(long)]
        inspect: bool,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Issue a messaging token for a user account
    IssueRtm {
        /// User account the token is issued for
        #[arg(short, long)]
        account: String,

        /// Token lifetime in seconds
        #[arg(short, long)]
        expire: Option<u32>,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Decode a token into its fields without verifying it
    Inspect {
        /// Token to inspect (reads stdin if neither this nor --token-file is given)
        token: Option<String>,

        /// Read the token from a file
        #[arg(long, conflicts_with = "token")]
        token_file: Option<PathBuf>,

        /// Report whatever can be decoded instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create the configuration file with defaults
    Init {
        /// Overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to get (omit to show all)
        key: Option<String>,
    },

    /// Show the configuration file path
    Path,
}
