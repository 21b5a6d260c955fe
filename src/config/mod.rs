pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "smartstore-uploader")]
#[command(about = "Register scraped wholesale products on the commerce platform")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "smartstore.toml")]
    pub config: String,

    /// JSON file with one scraped product or an array of them
    #[arg(short, long)]
    pub input: Option<String>,

    /// Update an existing origin product instead of creating a new one
    #[arg(long)]
    pub update: Option<u64>,

    /// Print the formatted payload without calling the platform
    #[arg(long)]
    pub dry_run: bool,

    /// Only check that the credentials can obtain a token
    #[arg(long)]
    pub check_credentials: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
