use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "habitual", version, author, about = "Track daily habits, streaks and weekly progress")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new habit
    Add {
        /// Habit title (max 100 characters)
        title: String,
        /// Optional description (max 500 characters)
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List active habits and whether each is done today
    List,
    /// Show one habit
    Show {
        /// Habit id or title
        habit: String,
    },
    /// Change a habit's title or description
    Edit {
        /// Habit id or title
        habit: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a habit (its history is kept)
    Remove {
        /// Habit id or title
        habit: String,
    },
    /// Mark a habit as completed
    Done {
        /// Habit id or title
        habit: String,
        /// Day to record (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show every recorded completion of a habit
    Logs {
        /// Habit id or title
        habit: String,
    },
    /// Progress of a single habit
    Progress {
        /// Habit id or title
        habit: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Dashboard statistics across all habits
    Stats {
        /// Show a per-day chart for the progress window
        #[arg(long)]
        week: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Export a weekly text summary to stdout
    Export,
    /// Show the config file location and current settings
    Config {
        /// Write a config file with default settings if none exists
        #[arg(long)]
        init: bool,
    },
}
