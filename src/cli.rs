use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "personakit",
    about = "Manage agent personas and the live session state the agent reads",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/personakit/logs/personakit.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to personakit.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage built-in and custom personas
    Persona {
        #[command(subcommand)]
        action: PersonaAction,
    },

    /// Drive the live session state
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum PersonaAction {
    /// List all personas (built-in first, then custom)
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show one persona
    Show {
        /// Persona id
        id: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Create a custom persona
    Create {
        /// Display name of the agent
        #[arg(long)]
        name: String,

        /// System prompt the agent runs with
        #[arg(long)]
        prompt: String,

        /// Icon (see `personakit persona icons`)
        #[arg(long, default_value = "🤖")]
        icon: String,
    },

    /// Update a custom persona
    Update {
        /// Custom persona id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        prompt: Option<String>,

        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a custom persona (no-op if it does not exist)
    Delete {
        /// Custom persona id
        id: String,
    },

    /// List icons available for custom personas
    Icons,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a new session, replacing any previous one
    Start {
        /// Persona to start with (defaults to session.default_persona)
        #[arg(long)]
        persona: Option<String>,
    },

    /// Switch the active persona
    Select {
        /// Persona id (unknown ids fall back to the default persona)
        id: String,
    },

    /// Merge a JSON patch into the session state
    Patch {
        /// Patch JSON (reads from stdin if not provided)
        json: Option<String>,
    },

    /// Append a proverb
    Proverb {
        /// Proverb text
        text: String,
    },

    /// Remove a proverb by its position (as numbered by `session show`)
    RemoveProverb {
        /// Zero-based proverb index
        index: usize,
    },

    /// Set the theme color
    Theme {
        /// CSS color, e.g. #f97316
        color: String,
    },

    /// Show the session state
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// End the session
    End,

    /// Forget the saved session entirely
    Reset,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// New value
        value: String,
    },
}
