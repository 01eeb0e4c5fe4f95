//! CLI - Command Line Interface for phimcli
//!
//! The render-collaborator seam. Every browse/search/detail/play action
//! is scriptable and all output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Browse the latest listing (auto-aggregates up to 5 pages)
//! phimcli latest --json
//!
//! # Filter and search
//! phimcli genre hanh-dong
//! phimcli search "the batman"
//!
//! # Detail and playback
//! phimcli detail inception
//! phimcli play inception -s 1 -e 1 --player mpv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// All network routes exhausted
    NetworkError = 3,
    /// Movie / server / episode not found
    NotFound = 4,
    /// Episode exists but has no playable source
    NoSource = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// phimcli - resilient movie-catalog browser
#[derive(Parser, Debug)]
#[command(
    name = "phimcli",
    version,
    author = "Gorka & Hermes",
    about = "Resilient movie-catalog browser for CORS-hostile streaming APIs",
    long_about = "Browse, search, and play from a movie-catalog API that \
                  cannot be relied on to answer directly: every request \
                  falls back through a chain of public CORS relays with \
                  response validation.",
    after_help = "EXAMPLES:\n\
                  phimcli latest                     Browse the latest listing\n\
                  phimcli search \"the batman\"        Search (single page)\n\
                  phimcli detail inception           Show servers and episodes\n\
                  phimcli play inception -s 1 -e 1   Resolve and play a source"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse the latest listing
    #[command(visible_alias = "ls")]
    Latest(ListCmd),

    /// Browse a category (phim-le, phim-bo, hoat-hinh, ...)
    #[command(visible_alias = "cat")]
    Category(FilterCmd),

    /// Browse a genre
    #[command(visible_alias = "g")]
    Genre(FilterCmd),

    /// Browse by country
    Country(FilterCmd),

    /// Browse by release year
    Year(FilterCmd),

    /// Search by keyword (single page, no auto-aggregation)
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Search-suggestion style lookup (few results, fast)
    Suggest(SuggestCmd),

    /// Featured slice of the latest listing
    #[command(visible_alias = "f")]
    Featured(FeaturedCmd),

    /// Show servers, episodes, and tags for a movie
    #[command(visible_alias = "i")]
    Detail(DetailCmd),

    /// Resolve an episode's source and play it
    #[command(visible_alias = "p")]
    Play(PlayCmd),

    /// Get or set the persisted theme preference
    Theme(ThemeCmd),
}

// =============================================================================
// Listing Commands
// =============================================================================

/// Shared options for listing commands
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Maximum number of items to print (0 = all accumulated)
    #[arg(long, short = 'l', default_value = "0")]
    pub limit: usize,

    /// Manually request this many extra pages past the auto-load window
    #[arg(long, short = 'm', default_value = "0")]
    pub more: u32,
}

/// Listing command carrying a filter value
#[derive(Args, Debug)]
pub struct FilterCmd {
    /// Filter value (category/genre/country slug, or year)
    #[arg(required = true)]
    pub value: String,

    #[command(flatten)]
    pub list: ListCmd,
}

/// Search by free-text keyword
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search keyword
    #[arg(required = true)]
    pub keyword: String,

    /// Maximum number of results to print (0 = all)
    #[arg(long, short = 'l', default_value = "0")]
    pub limit: usize,
}

/// Suggestion lookup: a truncated search
#[derive(Args, Debug)]
pub struct SuggestCmd {
    /// Keyword prefix
    #[arg(required = true)]
    pub keyword: String,

    /// Maximum number of suggestions
    #[arg(long, short = 'l', default_value = "8")]
    pub limit: usize,
}

/// Featured slice of the latest listing
#[derive(Args, Debug)]
pub struct FeaturedCmd {
    /// Number of featured items
    #[arg(long, short = 'l', default_value = "5")]
    pub limit: usize,
}

// =============================================================================
// Detail / Play Commands
// =============================================================================

/// Show detail for a movie
#[derive(Args, Debug)]
pub struct DetailCmd {
    /// Movie slug (from listing output)
    #[arg(required = true)]
    pub slug: String,
}

/// Resolve and play an episode source
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Movie slug (from listing output)
    #[arg(required = true)]
    pub slug: String,

    /// Server number (1-based, from detail output)
    #[arg(long, short = 's', default_value = "1")]
    pub server: usize,

    /// Episode number (1-based, from detail output)
    #[arg(long, short = 'e', default_value = "1")]
    pub episode: usize,

    /// Player for HLS sources
    #[arg(long, short = 'p', value_enum, default_value = "vlc")]
    pub player: PlayerChoice,
}

/// Local player selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerChoice {
    /// VLC media player (default)
    #[default]
    Vlc,
    /// mpv media player
    Mpv,
}

/// Get or set the theme preference
#[derive(Args, Debug)]
pub struct ThemeCmd {
    /// New theme (light or dark); omit to print the current one
    pub value: Option<String>,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print a plain line in text mode (suppressed under --json)
    pub fn line(&self, msg: impl std::fmt::Display) {
        if !self.json {
            println!("{}", msg);
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
