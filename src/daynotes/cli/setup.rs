use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daynotes", bin_name = "daynotes", version)]
#[command(about = "Daily notes, filed by the day they belong to", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's note (the default)
    #[command(alias = "t")]
    Today,

    /// List the notes of a day (defaults to the selected day)
    #[command(alias = "ls")]
    List {
        /// Day as YYYY-MM-DD
        date: Option<String>,
    },

    /// List every day that has notes, newest first
    Days,

    /// Create a note and select it
    #[command(alias = "n")]
    New {
        /// Day as YYYY-MM-DD (defaults to today)
        date: Option<String>,
    },

    /// Select a day, and optionally one of its notes
    #[command(alias = "s")]
    Select {
        /// Day as YYYY-MM-DD
        date: String,

        /// Note id (defaults to the day's first note)
        id: Option<String>,
    },

    /// Show the selected note
    Show,

    /// Replace the selected note's content
    #[command(alias = "w")]
    Write {
        /// New content (read from stdin when omitted)
        text: Option<String>,
    },

    /// Set the selected note's title
    Title {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Day as YYYY-MM-DD
        date: String,

        /// Note id
        id: String,
    },

    /// Show or change the theme
    Theme {
        /// Theme to switch to (lists themes when omitted)
        name: Option<String>,
    },

    /// Format a code snippet
    #[command(alias = "fmt")]
    Format {
        /// Language (detected when omitted)
        #[arg(short, long)]
        lang: Option<String>,

        /// File to read (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Get or set configuration values
    Config {
        /// Configuration key (e.g. autosave-delay-ms)
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },

    /// Remove every stored note and preference
    Clear,
}
