//! Name-based sender identity.
//!
//! A [`SenderTable`] maps participant names to ids across all rooms of an
//! import run. It is seeded from previously stored senders, read by the room
//! assembler and only grows through [`SenderTable::absorb`] once a room has
//! been stored, so one owner serializes every insert.

use std::collections::HashMap;
#[cfg(feature = "json-output")]
use std::fs::File;
#[cfg(feature = "json-output")]
use std::io::{BufReader, BufWriter, Write};
#[cfg(feature = "json-output")]
use std::path::Path;

use uuid::Uuid;

use super::models::SenderRow;
use crate::error::{ChatvaultError, Result};

/// Display name of the platform author.
pub const SYSTEM_SENDER_NAME: &str = "WhatsApp System";

/// The single author of notices that name no actor.
///
/// Obtained once per run and passed to every assembly. A [`SenderTable`]
/// keeps it under [`SYSTEM_SENDER_NAME`] so a stored table reuses the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSender {
    id: Uuid,
}

impl SystemSender {
    /// Uses a known id, e.g. one already in the store.
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    /// Creates a fresh id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Row the sink upserts once per run.
    pub fn row(&self) -> SenderRow {
        SenderRow::new(self.id, SYSTEM_SENDER_NAME)
    }
}

/// Lookup table from sender name to id.
///
/// # Example
///
/// ```rust
/// use chatvault::core::senders::SenderTable;
/// use uuid::Uuid;
///
/// let alice = Uuid::new_v4();
/// let mut table = SenderTable::seeded([("Alice".to_string(), alice)]);
///
/// assert_eq!(table.get("Alice"), Some(alice));
/// let bob = table.resolve("Bob");
/// assert_eq!(table.resolve("Bob"), bob);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderTable {
    ids: HashMap<String, Uuid>,
}

impl SenderTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from stored `(name, id)` pairs.
    pub fn seeded(pairs: impl IntoIterator<Item = (String, Uuid)>) -> Self {
        Self {
            ids: pairs.into_iter().collect(),
        }
    }

    /// Looks up the id of a name.
    pub fn get(&self, name: &str) -> Option<Uuid> {
        self.ids.get(name).copied()
    }

    /// Returns the id of a name, creating one on first sight.
    pub fn resolve(&mut self, name: &str) -> Uuid {
        if let Some(id) = self.get(name) {
            return id;
        }
        let id = Uuid::new_v4();
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Merges senders created during a room assembly.
    ///
    /// Either every row is merged or none is: a name that already maps to a
    /// different id is a [`ChatvaultError::SenderConflict`] and leaves the
    /// table unchanged.
    pub fn absorb(&mut self, rows: &[SenderRow]) -> Result<()> {
        for row in rows {
            if let Some(existing) = self.get(&row.name) {
                if existing != row.id {
                    return Err(ChatvaultError::SenderConflict {
                        name: row.name.clone(),
                        existing,
                        incoming: row.id,
                    });
                }
            }
        }
        for row in rows {
            self.ids.insert(row.name.clone(), row.id);
        }
        Ok(())
    }

    /// The system sender stored under its reserved name, if any.
    pub fn system_sender(&self) -> Option<SystemSender> {
        self.get(SYSTEM_SENDER_NAME).map(SystemSender::new)
    }

    /// Stores `system` under its reserved name, replacing an earlier one.
    ///
    /// A table saved afterwards hands the same id to the next run.
    pub fn set_system_sender(&mut self, system: &SystemSender) {
        self.ids.insert(SYSTEM_SENDER_NAME.to_string(), system.id());
    }

    /// Exports all pairs, sorted by name.
    pub fn to_pairs(&self) -> Vec<(String, Uuid)> {
        let mut pairs: Vec<_> = self
            .ids
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Loads a table from a JSON object `{"name": "uuid", ...}`.
    #[cfg(feature = "json-output")]
    pub fn load_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let ids: HashMap<String, Uuid> = serde_json::from_reader(reader)?;
        Ok(Self { ids })
    }

    /// Saves the table as a JSON object, keys sorted.
    #[cfg(feature = "json-output")]
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let sorted: std::collections::BTreeMap<_, _> = self.ids.iter().collect();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &sorted)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
