use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aicompanion")]
#[command(about = "Virtual companion with an evolving relationship", version)]
pub struct Args {
    /// Data directory (config, database, log)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Console log level (default warn), overridden by RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, show, edit or delete the companion
    Character {
        #[command(subcommand)]
        command: CharacterCommands,
    },
    /// Send a message; without one, start an interactive conversation
    Chat {
        message: Option<String>,
        /// AI provider (gemini, openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model name
        #[arg(short, long)]
        model: Option<String>,
        /// Attach a photo
        #[arg(long, conflicts_with = "audio")]
        image: Option<PathBuf>,
        /// Attach a voice note
        #[arg(long)]
        audio: Option<PathBuf>,
    },
    /// Show the relationship status
    Status,
    /// Browse and edit the diary
    Diary {
        #[command(subcommand)]
        command: DiaryCommands,
    },
    /// Run the special-date and reminder checks once
    Tick,
    /// Keep running the scheduled checks until Ctrl-C
    Watch,
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// Create a new companion (resets any existing relationship)
    Create {
        name: String,
        #[arg(long, default_value = "")]
        personality: String,
        #[arg(long, default_value = "")]
        interests: String,
        #[arg(long, default_value = "20")]
        age: u32,
        #[arg(long, default_value = "")]
        speaking_style: String,
        /// YYYY-MM-DD
        #[arg(long)]
        birthday: Option<NaiveDate>,
    },
    /// Show the current companion
    Show,
    /// Change persona fields without resetting the relationship
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        personality: Option<String>,
        #[arg(long)]
        interests: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        speaking_style: Option<String>,
        #[arg(long)]
        birthday: Option<NaiveDate>,
    },
    /// Delete the companion together with score, diary and history
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum DiaryCommands {
    /// List entries, newest first
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Write an entry by hand
    Add { title: String, content: String },
    /// Delete an entry by id
    Delete { id: String },
}
