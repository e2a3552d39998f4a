//! System-event phrase catalogs and the locale contract.
//!
//! A catalog is an **ordered** list of rules. Phrases overlap textually
//! ("X hat dich hinzugefügt" is also "X hat Y hinzugefügt" with `Y = dich`),
//! so matching walks the list in priority order and stops at the first rule
//! whose pattern matches the whole event text. Reordering a catalog changes
//! what it recognizes.
//!
//! Every rule lists the [`Field`] each capture group feeds, in group order.

use regex::Regex;

use crate::message::SystemEvent;

/// Which record field a capture group feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Sender,
    Target,
    NewRoomName,
    NewNumber,
}

/// Declarative catalog entry: a phrase pattern and the fields it captures.
///
/// Patterns are written without anchors; the catalog anchors them to the
/// start and the end of the event text when it compiles them.
#[derive(Debug, Clone, Copy)]
pub struct EventRule {
    pub event: SystemEvent,
    pub pattern: &'static str,
    pub fields: &'static [Field],
}

/// Fields extracted from a matched phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCaptures<'a> {
    pub sender: Option<&'a str>,
    pub target: Option<&'a str>,
    pub new_room_name: Option<&'a str>,
    pub new_number: Option<&'a str>,
}

/// A successful catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMatch<'a> {
    /// Position of the winning rule in the catalog
    pub priority: usize,
    pub event: SystemEvent,
    pub captures: EventCaptures<'a>,
}

struct CompiledRule {
    rule: EventRule,
    regex: Regex,
}

/// Compiled, ordered phrase catalog.
pub struct EventCatalog {
    rules: Vec<CompiledRule>,
}

impl EventCatalog {
    /// Compiles rules in the given priority order.
    ///
    /// # Panics
    ///
    /// Panics if a pattern is not a valid regex or its group count differs
    /// from its field list. Catalogs are static tables, so this is a
    /// programming error caught by the catalog's own tests.
    pub fn new(rules: &[EventRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| {
                let regex = Regex::new(&format!("^(?:{})$", rule.pattern))
                    .unwrap_or_else(|e| panic!("invalid pattern for {}: {e}", rule.event));
                assert_eq!(
                    regex.captures_len() - 1,
                    rule.fields.len(),
                    "capture groups of {} do not line up with its fields",
                    rule.event
                );
                CompiledRule { rule: *rule, regex }
            })
            .collect();
        Self { rules }
    }

    /// Finds the first rule, in priority order, matching the whole text.
    pub fn classify<'a>(&self, text: &'a str) -> Option<EventMatch<'a>> {
        self.rules.iter().enumerate().find_map(|(priority, compiled)| {
            let caps = compiled.regex.captures(text)?;
            let mut captures = EventCaptures::default();
            for (group, field) in compiled.rule.fields.iter().enumerate() {
                let value = caps.get(group + 1).map(|m| m.as_str());
                match field {
                    Field::Sender => captures.sender = value,
                    Field::Target => captures.target = value,
                    Field::NewRoomName => captures.new_room_name = value,
                    Field::NewNumber => captures.new_number = value,
                }
            }
            Some(EventMatch {
                priority,
                event: compiled.rule.event,
                captures,
            })
        })
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the catalog has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in priority order.
    pub fn rules(&self) -> impl Iterator<Item = &EventRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }
}

impl std::fmt::Debug for EventCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCatalog")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Everything locale-specific about an export.
///
/// The header shape (`DD.MM.YY, HH:MM - `) is shared; phrasing, markers and
/// file naming are not.
pub trait Locale: Send + Sync {
    /// Identifier, e.g. `"de_de"`.
    fn id(&self) -> &'static str;

    /// Text that follows a filename in a "file attached" message.
    fn file_attached_suffix(&self) -> &'static str;

    /// Whole-message markers for media left out of the export.
    fn file_excluded_markers(&self) -> &'static [&'static str];

    /// Ordered system-event catalog.
    fn catalog(&self) -> &EventCatalog;

    /// File stem prefix of an exported chat, e.g. `"WhatsApp Chat mit "`.
    fn chat_file_prefix(&self) -> &'static str;

    /// Extension of an exported chat (without dot).
    fn chat_file_extension(&self) -> &'static str {
        "txt"
    }
}
