use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "roam")]
#[command(about = "Keep a travel diary of photos, places and notes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding entries, captured photos and config
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a new travel entry
    #[command(alias = "new")]
    Add {
        /// Entry text (read from stdin when omitted)
        text: Vec<String>,
        /// Photo file to capture with the camera
        #[arg(long, value_name = "PATH", conflicts_with = "pick")]
        photo: Option<PathBuf>,
        /// Use the Nth photo from `roam gallery`
        #[arg(long, value_name = "N")]
        pick: Option<usize>,
        /// Use the configured fallback label when the location is unknown
        #[arg(long)]
        skip_location: bool,
    },
    /// List saved entries, oldest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the entry at a list index
    #[command(alias = "rm")]
    Delete {
        /// Index as shown by `roam list`
        #[arg(allow_negative_numbers = true)]
        index: i64,
        /// Delete without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show recent gallery photos available to pick
    Gallery {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show capability grants and the resolved location
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export entries
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Inspect or edit the diary configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for roam_core::export::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PermissionChoice {
    Granted,
    Denied,
    Prompt,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Create or update the configuration file
    Init(ConfigInitArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ConfigInitArgs {
    /// Directory browsed as the photo gallery
    #[arg(long, value_name = "PATH")]
    pub gallery_dir: Option<PathBuf>,
    /// Latitude reported as the device position
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    /// Longitude reported as the device position
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
    /// Reverse geocoding service base URL
    #[arg(long, value_name = "URL")]
    pub geocoder_url: Option<String>,
    /// Number of recent gallery photos to sample
    #[arg(long, value_name = "N")]
    pub sample_limit: Option<usize>,
    /// Seconds to wait for a position fix
    #[arg(long, value_name = "SECS")]
    pub location_timeout: Option<u64>,
    /// Allow saving with this label when no location resolves
    #[arg(long, value_name = "LABEL", conflicts_with = "require_location")]
    pub fallback_label: Option<String>,
    /// Block saving until a location resolves
    #[arg(long)]
    pub require_location: bool,
    /// Preset answer for every capability
    #[arg(long, value_enum, value_name = "ANSWER")]
    pub permissions: Option<PermissionChoice>,
}
