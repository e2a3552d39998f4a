//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputFormat`] - how rooms are written, picked from the output path
//!
//! # Example
//!
//! ```rust
//! use chatvault::cli::OutputFormat;
//! use std::path::Path;
//!
//! assert_eq!(OutputFormat::from_path(Path::new("rooms.json")), OutputFormat::Json);
//! assert_eq!(OutputFormat::from_path(Path::new("messages.jsonl")), OutputFormat::Jsonl);
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use uuid::Uuid;

use crate::config::{ImportConfig, ParserConfig, UnknownEventPolicy};
use crate::parser::LocaleId;

/// Import WhatsApp chat exports into message, room and sender rows.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatvault")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatvault \"WhatsApp Chat mit Eiergilde.txt\"
    chatvault exports/ -o rooms.jsonl --senders senders.json
    chatvault exports/ -o rooms.json --strict
    RUST_LOG=chatvault=debug chatvault exports/")]
pub struct Args {
    /// Export file or directory searched recursively for exports
    #[arg(value_name = "CHAT_FILES")]
    pub input: PathBuf,

    /// Output file; a .json extension writes one JSON document instead of rows
    #[arg(short, long, default_value = "messages.jsonl")]
    pub output: PathBuf,

    /// Export language
    #[arg(short, long, default_value = "de_de")]
    pub locale: LocaleId,

    /// Sender table (JSON object of name to id), read before and written
    /// after the import
    #[arg(long, value_name = "FILE")]
    pub senders: Option<PathBuf>,

    /// Id of the system sender; overrides the one stored in --senders
    #[arg(long, value_name = "UUID")]
    pub system_sender: Option<Uuid>,

    /// Fail a file on system events that are not in the catalog
    #[arg(long)]
    pub strict: bool,

    /// Parse files one after another
    #[arg(long)]
    pub sequential: bool,

    /// Show per-file progress
    #[arg(short, long)]
    pub progress: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Import settings selected by the flags.
    pub fn import_config(&self) -> ImportConfig {
        let policy = if self.strict {
            UnknownEventPolicy::Fail
        } else {
            UnknownEventPolicy::Degrade
        };
        ImportConfig::new()
            .with_parser(
                ParserConfig::new()
                    .with_locale(self.locale)
                    .with_unknown_events(policy),
            )
            .with_parallel(!self.sequential)
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_path(&self.output)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// One row per line, tagged with its table
    #[default]
    Jsonl,

    /// Pretty array of whole rooms
    Json,
}

impl OutputFormat {
    /// Picks the format from a file extension; anything but `.json` is JSONL.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Jsonl,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Jsonl => write!(f, "JSONL"),
            OutputFormat::Json => write!(f, "JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chatvault", "exports"]).unwrap();
        assert_eq!(args.output, PathBuf::from("messages.jsonl"));
        assert_eq!(args.locale, LocaleId::DeDe);
        assert_eq!(args.output_format(), OutputFormat::Jsonl);

        let config = args.import_config();
        assert!(config.parallel);
        assert!(!config.parser.is_strict());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "chatvault",
            "exports",
            "-o",
            "rooms.JSON",
            "-l",
            "de",
            "--strict",
            "--sequential",
            "--system-sender",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
        ])
        .unwrap();

        assert_eq!(args.output_format(), OutputFormat::Json);
        assert!(args.system_sender.is_some());
        let config = args.import_config();
        assert!(!config.parallel);
        assert!(config.parser.is_strict());
    }

    #[test]
    fn test_rejects_unknown_locale() {
        assert!(Args::try_parse_from(["chatvault", "x", "--locale", "xx"]).is_err());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "JSON");
        assert_eq!(OutputFormat::Jsonl.to_string(), "JSONL");
    }
}
