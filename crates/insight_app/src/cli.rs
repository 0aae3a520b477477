use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Insight - summarize web pages with a search-grounded language model
#[derive(Parser, Debug)]
#[command(name = "insight")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    GEMINI_API_KEY  Provider API key (API_KEY is also accepted)")]
pub struct Cli {
    /// Configuration file (defaults to config.ron in the data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log destination: file, terminal or both
    #[arg(long, global = true, default_value = "file")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Analyze a web page and record the result
    Analyze {
        /// The page to analyze (http or https)
        url: String,
    },

    /// Totals, success rate, sentiment split and recent activity
    Overview,

    /// All analyses, newest first
    History,

    /// Full details of one analysis
    Show {
        id: String,
    },

    /// Delete an analysis permanently
    Delete {
        id: String,
    },

    /// Export one result, or everything when no id is given
    Export {
        /// Task to export
        #[arg(long)]
        id: Option<String>,

        /// Folder to write into (results land in its scraped_data subfolder)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}
