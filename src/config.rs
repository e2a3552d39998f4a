//! Configuration types for parsing, assembly and batch import.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`ParserConfig`] - grammar locale and unknown-event policy
//! - [`AssemblerConfig`] - how assembled rows are labelled
//! - [`ImportConfig`] - both of the above plus batch scheduling
//!
//! # Example
//!
//! ```rust
//! use chatvault::config::{ImportConfig, ParserConfig, UnknownEventPolicy};
//!
//! let config = ImportConfig::new()
//!     .with_parser(ParserConfig::new().with_unknown_events(UnknownEventPolicy::Fail))
//!     .with_parallel(false);
//!
//! assert!(!config.parallel);
//! ```

use serde::{Deserialize, Serialize};

use crate::parser::LocaleId;

/// What to do with a header line that matches no catalog phrase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownEventPolicy {
    /// Keep the line as an untyped system record and log a warning
    #[default]
    Degrade,

    /// Fail the whole file
    Fail,
}

/// Configuration for the grammar and reducer.
///
/// # Example
///
/// ```rust
/// use chatvault::config::{ParserConfig, UnknownEventPolicy};
/// use chatvault::parser::LocaleId;
///
/// let config = ParserConfig::new()
///     .with_locale(LocaleId::DeDe)
///     .with_unknown_events(UnknownEventPolicy::Fail);
/// assert!(config.is_strict());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Export locale (default: de_de)
    pub locale: LocaleId,

    /// Handling of unrecognized system events (default: degrade)
    pub unknown_events: UnknownEventPolicy,
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that fails on unrecognized system events.
    pub fn strict() -> Self {
        Self {
            unknown_events: UnknownEventPolicy::Fail,
            ..Self::default()
        }
    }

    /// Sets the export locale.
    #[must_use]
    pub fn with_locale(mut self, locale: LocaleId) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the unknown-event policy.
    #[must_use]
    pub fn with_unknown_events(mut self, policy: UnknownEventPolicy) -> Self {
        self.unknown_events = policy;
        self
    }

    /// Returns `true` if unrecognized system events fail the parse.
    pub fn is_strict(&self) -> bool {
        self.unknown_events == UnknownEventPolicy::Fail
    }
}

/// Configuration for the room assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Prefix of every message's `variant_tag`, e.g. `chatvault.room_message`
    /// (default: "chatvault")
    pub type_namespace: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            type_namespace: "chatvault".to_string(),
        }
    }
}

impl AssemblerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the variant tag namespace.
    #[must_use]
    pub fn with_type_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.type_namespace = namespace.into();
        self
    }

    /// Builds the `variant_tag` for a record tag.
    pub fn variant_tag(&self, tag: &str) -> String {
        if self.type_namespace.is_empty() {
            tag.to_string()
        } else {
            format!("{}.{}", self.type_namespace, tag)
        }
    }
}

/// Configuration for a batch import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub parser: ParserConfig,

    pub assembler: AssemblerConfig,

    /// Parse files concurrently (default: true, needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            assembler: AssemblerConfig::default(),
            parallel: true,
        }
    }
}

impl ImportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parser configuration.
    #[must_use]
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Sets the assembler configuration.
    #[must_use]
    pub fn with_assembler(mut self, assembler: AssemblerConfig) -> Self {
        self.assembler = assembler;
        self
    }

    /// Enables or disables concurrent parsing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
