//! Threads one room's sanitized records into storage rows.
//!
//! Records are numbered from depth 1 and chained in file order: every
//! message points at its predecessor, and the first one becomes the room's
//! entry point. Sender names resolve through the shared [`SenderTable`],
//! which is only read here; names seen for the first time get fresh ids
//! returned in [`AssembledRoom::senders`] for the caller to absorb once the
//! room has been stored.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;

use super::models::{AssembledRoom, FileRow, LinkRow, MessageRow, RoomRow, SenderRow};
use super::sanitizer::LEFT_TO_RIGHT_MARK;
use super::senders::{SenderTable, SystemSender};
use crate::config::AssemblerConfig;
use crate::error::{ChatvaultError, Result};
use crate::message::{Capabilities, Record, RecordBody};

/// Assembles the rows of one room.
///
/// Returns `Ok(None)` for a room without records.
///
/// # Errors
///
/// Returns [`ChatvaultError::InvalidRecord`] if a record still carries
/// continuation text, breaks the file invariants, or lacks a field its
/// capabilities promise. Nothing is produced for the room in that case.
///
/// # Example
///
/// ```rust
/// use chatvault::config::AssemblerConfig;
/// use chatvault::core::assembler::assemble_room;
/// use chatvault::core::senders::{SenderTable, SystemSender};
/// use chatvault::parser::{LogParser, Parser};
///
/// let records = LogParser::new().parse_str(
///     "16.01.21, 23:09 - Alice: Hi\n16.01.21, 23:10 - Bob: Hey\n",
/// )?;
///
/// let table = SenderTable::new();
/// let room = assemble_room(
///     &records,
///     "Alice",
///     &table,
///     &SystemSender::generate(),
///     &AssemblerConfig::default(),
/// )?
/// .unwrap();
///
/// assert!(room.room.is_dm);
/// assert_eq!(room.messages.len(), 2);
/// assert_eq!(room.links.len(), 1);
/// assert_eq!(room.senders.len(), 2);
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
pub fn assemble_room(
    records: &[Record],
    room_name: &str,
    senders: &SenderTable,
    system: &SystemSender,
    config: &AssemblerConfig,
) -> Result<Option<AssembledRoom>> {
    let Some(first) = records.first() else {
        debug!(room = room_name, "no records, skipping room");
        return Ok(None);
    };

    for record in records {
        validate(record)?;
    }

    let room_id = Uuid::new_v4();
    let is_dm = !first.is_room_creation();
    let mut staged = StagedSenders::new(senders);
    let mut members = HashSet::new();

    let mut messages = Vec::with_capacity(records.len());
    let mut links = Vec::with_capacity(records.len().saturating_sub(1));
    let mut files = Vec::new();
    let mut parent: Option<Uuid> = None;

    for (index, record) in records.iter().enumerate() {
        let id = Uuid::new_v4();

        let sender_id = match record.sender() {
            Some(name) => {
                let id = staged.resolve(name);
                members.insert(id);
                id
            }
            None => system.id(),
        };

        let target_user_id = if record.capabilities().contains(Capabilities::HAS_TARGET_USER) {
            record.target().map(|name| {
                let id = staged.resolve(name);
                members.insert(id);
                id
            })
        } else {
            None
        };

        let mut row = MessageRow {
            id,
            timestamp: record.timestamp,
            full_content: record.full_text.clone(),
            sender_id,
            room_id,
            depth: index + 1,
            variant_tag: config.variant_tag(record.tag()),
            content: None,
            file: false,
            file_lost: false,
            file_id: None,
            target_user_id,
            new_room_name: None,
            new_number: None,
        };

        match &record.body {
            RecordBody::User(msg) => {
                row.content.clone_from(&msg.text);
                row.file = msg.file;
                row.file_lost = msg.file_lost;
                if msg.file {
                    let file = FileRow {
                        id: Uuid::new_v4(),
                        filename: msg.filename.clone(),
                    };
                    row.file_id = Some(file.id);
                    files.push(file);
                }
            }
            RecordBody::System(sys) => {
                let caps = sys.event.capabilities();
                if caps.contains(Capabilities::HAS_NEW_ROOM_NAME) {
                    row.new_room_name.clone_from(&sys.new_room_name);
                }
                if caps.contains(Capabilities::HAS_NEW_NUMBER) {
                    row.new_number.clone_from(&sys.new_number);
                }
            }
        }

        if let Some(parent_message_id) = parent {
            links.push(LinkRow {
                message_id: id,
                parent_message_id,
            });
        }
        parent = Some(id);
        messages.push(row);
    }

    members.remove(&system.id());

    let room = RoomRow {
        id: room_id,
        name: room_name.to_string(),
        is_dm,
        first_message_id: messages[0].id,
        member_count: members.len(),
    };

    let assembled = AssembledRoom {
        room,
        senders: staged.into_created(),
        messages,
        links,
        files,
    };

    debug!(
        room = room_name,
        is_dm,
        messages = assembled.messages.len(),
        new_senders = assembled.senders.len(),
        files = assembled.files.len(),
        "assembled room"
    );

    Ok(Some(assembled))
}

/// Checks what the assembler relies on.
fn validate(record: &Record) -> Result<()> {
    // Sender identity is keyed by name, so a marked name would split a sender.
    if let Some(name) = record
        .sender()
        .into_iter()
        .chain(record.target())
        .find(|name| name.starts_with(LEFT_TO_RIGHT_MARK))
    {
        return Err(ChatvaultError::invalid_record(format!(
            "unsanitized name {name:?} at {}",
            record.timestamp
        )));
    }

    match &record.body {
        RecordBody::User(msg) => {
            if msg.continued_text.is_some() {
                return Err(ChatvaultError::invalid_record(format!(
                    "unsanitized continuation text in message at {}",
                    record.timestamp
                )));
            }
            msg.validate()
        }
        RecordBody::System(sys) => {
            let caps = sys.event.capabilities();
            let missing = if caps.contains(Capabilities::HAS_TARGET_USER) && sys.target.is_none() {
                Some("target")
            } else if caps.contains(Capabilities::HAS_NEW_ROOM_NAME) && sys.new_room_name.is_none() {
                Some("new_room_name")
            } else if caps.contains(Capabilities::HAS_NEW_NUMBER) && sys.new_number.is_none() {
                Some("new_number")
            } else {
                None
            };
            match missing {
                Some(field) => Err(ChatvaultError::invalid_record(format!(
                    "{} notice at {} has no {field}",
                    sys.event, record.timestamp
                ))),
                None => Ok(()),
            }
        }
    }
}

/// Read-only view of the table plus the senders this room adds.
struct StagedSenders<'t> {
    table: &'t SenderTable,
    created: HashMap<String, Uuid>,
    order: Vec<SenderRow>,
}

impl<'t> StagedSenders<'t> {
    fn new(table: &'t SenderTable) -> Self {
        Self {
            table,
            created: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn resolve(&mut self, name: &str) -> Uuid {
        if let Some(id) = self.table.get(name).or_else(|| self.created.get(name).copied()) {
            return id;
        }
        let id = Uuid::new_v4();
        self.created.insert(name.to_string(), id);
        self.order.push(SenderRow::new(id, name));
        id
    }

    fn into_created(self) -> Vec<SenderRow> {
        self.order
    }
}
