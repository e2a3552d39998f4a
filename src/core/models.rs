//! Rows produced by the room assembler.
//!
//! These are the prepared records a storage sink receives: one [`RoomRow`],
//! the senders first seen in the room, one [`MessageRow`] per record, the
//! parent links that chain messages in file order and one provisional
//! [`FileRow`] per message that references media.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Timestamp;

/// A chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderRow {
    pub id: Uuid,
    pub name: String,
}

impl SenderRow {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One conversation, i.e. one export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRow {
    pub id: Uuid,
    pub name: String,
    /// The log does not start with a group creation notice
    pub is_dm: bool,
    /// Entry point of the message chain
    pub first_message_id: Uuid,
    /// Distinct participants seen as sender or target
    pub member_count: usize,
}

/// One record placed in its room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: Uuid,
    pub timestamp: Timestamp,
    /// Verbatim source span
    pub full_content: String,
    pub sender_id: Uuid,
    pub room_id: Uuid,
    /// 1-based position in the room
    pub depth: usize,
    /// Namespaced record tag, e.g. `chatvault.room_message`
    pub variant_tag: String,

    /// Message text (user messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub content: Option<String>,

    pub file: bool,

    #[serde(default)]
    pub file_lost: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub file_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub target_user_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub new_room_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub new_number: Option<String>,
}

/// Parent/child edge of the per-room message chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRow {
    pub message_id: Uuid,
    pub parent_message_id: Uuid,
}

/// Provisional attachment awaiting reconciliation with the media inventory.
///
/// `filename` is `None` when the export left the media out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRow {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub filename: Option<String>,
}

/// Everything one room contributes to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledRoom {
    pub room: RoomRow,
    /// Senders created while assembling this room
    pub senders: Vec<SenderRow>,
    /// Messages in file order
    pub messages: Vec<MessageRow>,
    pub links: Vec<LinkRow>,
    pub files: Vec<FileRow>,
}

impl AssembledRoom {
    /// Number of rows across all tables.
    pub fn row_count(&self) -> usize {
        1 + self.senders.len() + self.messages.len() + self.links.len() + self.files.len()
    }
}
