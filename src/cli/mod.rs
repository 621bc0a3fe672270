use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stepscribe",
    about = "Stepscribe - Turn cooking video captions into clean transcripts and per-step time alignments",
    version,
    long_about = "A CLI tool that fetches auto-generated video captions, deduplicates them into a clean transcript, extracts a structured recipe, and predicts when each instruction step happens in the video."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a clean transcript from a video URL or local caption file
    Extract {
        /// Video URL or path to a local .vtt caption file
        #[arg(value_name = "URL_OR_FILE")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include per-segment timestamps in text output
        #[arg(long)]
        timestamps: bool,

        /// Bypass the extraction cache
        #[arg(long)]
        skip_cache: bool,
    },

    /// Align recipe steps with the video timeline
    Align {
        /// Video URL or path to a local .vtt caption file
        #[arg(value_name = "URL_OR_FILE")]
        url: String,

        /// Recipe JSON file; extracted with AI when not provided
        #[arg(short, long, value_name = "FILE")]
        recipe: Option<PathBuf>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Bypass the extraction cache
        #[arg(long)]
        skip_cache: bool,
    },

    /// Extract and cache transcripts for a file of video URLs
    Batch {
        /// File with one video URL per line
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Maximum concurrent extractions (default from config)
        #[arg(long, value_name = "COUNT")]
        concurrency: Option<usize>,

        /// Bypass the extraction cache
        #[arg(long)]
        skip_cache: bool,
    },

    /// Configure caching and extraction settings
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported platforms
    Platforms,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
