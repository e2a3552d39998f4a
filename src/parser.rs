//! Parser entry points for chat exports.
//!
//! A [`LogParser`] runs the grammar and the reducer for one locale and
//! attributes failures to the file they came from.
//!
//! # Example
//!
//! ```rust
//! use chatvault::parser::{LocaleId, Parser, create_parser};
//!
//! let parser = create_parser(LocaleId::DeDe);
//! let records = parser.parse_str("16.01.21, 23:09 - John Doe: Hi there\n")?;
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].sender(), Some("John Doe"));
//! # Ok::<(), chatvault::ChatvaultError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::error::{ChatvaultError, Result};
use crate::import::room_name_from_path;
use crate::message::Record;
use crate::parsing::{German, Locale, normalize, parse_structure, reduce};

/// Supported export locales.
///
/// # Example
///
/// ```rust
/// use chatvault::parser::LocaleId;
/// use std::str::FromStr;
///
/// let locale = LocaleId::from_str("de_de").unwrap();
/// assert_eq!(locale, LocaleId::DeDe);
///
/// // Aliases are supported
/// let locale = LocaleId::from_str("de").unwrap();
/// assert_eq!(locale, LocaleId::DeDe);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LocaleId {
    /// German exports ("WhatsApp Chat mit ...")
    #[default]
    #[serde(rename = "de_de", alias = "de", alias = "de-de")]
    DeDe,
}

impl LocaleId {
    /// Returns the grammar for this locale.
    pub fn locale(self) -> &'static dyn Locale {
        match self {
            LocaleId::DeDe => &German,
        }
    }

    /// Returns all locale names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["de_de", "de", "de-de"]
    }

    /// Returns all available locales.
    pub fn all() -> &'static [LocaleId] {
        &[LocaleId::DeDe]
    }
}

impl std::fmt::Display for LocaleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.locale().id())
    }
}

impl std::str::FromStr for LocaleId {
    type Err = ChatvaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "de_de" | "de" | "de-de" => Ok(LocaleId::DeDe),
            _ => Err(ChatvaultError::InvalidLocale {
                input: s.to_string(),
                expected: LocaleId::all_names().join(", "),
            }),
        }
    }
}

/// Common interface of chat log parsers.
pub trait Parser: Send + Sync {
    /// Returns the human-readable name of this parser.
    fn name(&self) -> &'static str;

    /// Returns the locale this parser reads.
    fn locale(&self) -> LocaleId;

    /// Parses an export file.
    ///
    /// Records carry the room name derived from the file name, and errors
    /// carry the path.
    fn parse(&self, path: &Path) -> Result<Vec<Record>>;

    /// Parses export text already in memory.
    fn parse_str(&self, content: &str) -> Result<Vec<Record>>;

    /// Parses an export file (convenience method accepting &str path).
    fn parse_file(&self, path: &str) -> Result<Vec<Record>> {
        self.parse(Path::new(path))
    }
}

/// Grammar-driven parser for plaintext exports.
#[derive(Debug, Clone, Default)]
pub struct LogParser {
    config: ParserConfig,
}

impl LogParser {
    /// Creates a parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl Parser for LogParser {
    fn name(&self) -> &'static str {
        "WhatsApp"
    }

    fn locale(&self) -> LocaleId {
        self.config.locale
    }

    fn parse(&self, path: &Path) -> Result<Vec<Record>> {
        let content = fs::read_to_string(path)?;
        let room_name = room_name_from_path(path, self.config.locale.locale());

        let records = self.parse_str(&content).map_err(|e| e.with_path(path))?;
        Ok(records
            .into_iter()
            .map(|record| record.with_room_name(room_name.as_str()))
            .collect())
    }

    fn parse_str(&self, content: &str) -> Result<Vec<Record>> {
        let text = normalize(content);
        let tree = parse_structure(&text, self.config.locale.locale())
            .map_err(|source| ChatvaultError::parse(source, None))?;
        reduce(tree, &self.config)
    }
}

/// Creates a parser for the specified locale.
///
/// # Example
///
/// ```rust
/// use chatvault::parser::{LocaleId, Parser, create_parser};
///
/// let parser = create_parser(LocaleId::DeDe);
/// assert_eq!(parser.locale(), LocaleId::DeDe);
/// ```
pub fn create_parser(locale: LocaleId) -> Box<dyn Parser> {
    Box::new(LogParser::with_config(ParserConfig::new().with_locale(locale)))
}
