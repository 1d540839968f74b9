//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nutrisage",
    version,
    about = "Nutrition answers grounded in your own documents",
    long_about = "Nutrisage looks up nutrition facts for food items and answers free-form \
                  nutrition questions using the text files in a local corpus as context."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/nutrisage/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get a nutrition breakdown for a food item
    Analyze {
        /// Food item name (e.g. "Almonds")
        food: String,

        /// Print the model output without list emphasis
        #[arg(long)]
        raw: bool,

        /// Print {"food", "nutrition_info"} JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask a nutrition question answered from the document corpus
    Ask {
        /// Question to ask
        question: String,

        /// Print {"question", "answer"} JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the corpus index and report on it
    Index {
        /// Corpus directory (defaults to corpus.path from config)
        #[arg(long, value_name = "DIR")]
        corpus: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
