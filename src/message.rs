//! Typed records produced by the classifier.
//!
//! Every logical unit of a chat log becomes one [`Record`]: the fields every
//! unit shares (timestamp, verbatim source text, optional sender) plus a
//! [`RecordBody`] that is either user-authored content ([`RoomMessage`]) or a
//! platform notice ([`SystemMessage`]).
//!
//! System notices form a closed set ([`SystemEvent`]). Which optional columns a
//! notice fills is described by its [`Capabilities`], so consumers can dispatch
//! on flags instead of enumerating variants.
//!
//! # Example
//!
//! ```
//! use chatvault::message::{Record, RoomMessage};
//! use chatvault::parsing::timestamp::parse_timestamp;
//!
//! let ts = parse_timestamp("16", "01", "21", "23", "09").unwrap();
//! let record = Record::user(ts, "16.01.21, 23:09 - John Doe: Hi\n", "John Doe", RoomMessage::text("Hi\n"));
//!
//! assert_eq!(record.sender(), Some("John Doe"));
//! assert_eq!(record.as_room_message().unwrap().text.as_deref(), Some("Hi\n"));
//! ```

use bitflags::bitflags;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{ChatvaultError, Result};

/// Civil timestamp resolved to the reference zone's offset at that instant.
pub type Timestamp = DateTime<FixedOffset>;

bitflags! {
    /// Optional columns a record populates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const HAS_TARGET_USER   = 1 << 0;
        const HAS_NEW_ROOM_NAME = 1 << 1;
        const HAS_NEW_NUMBER    = 1 << 2;
    }
}

/// One classified logical unit of a chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// When the unit was written, at minute resolution.
    pub timestamp: Timestamp,

    /// The verbatim source span: header line plus any continuation lines.
    pub full_text: String,

    /// Author name for user messages, actor name for third-party notices.
    ///
    /// `None` for notices about the exporting user or with no known actor.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub sender: Option<String>,

    /// Name of the room (file) the record was read from, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub room_name: Option<String>,

    /// Variant-specific content.
    pub body: RecordBody,
}

/// Variant-specific part of a [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordBody {
    /// User-authored content
    User(RoomMessage),
    /// Platform-issued notice
    System(SystemMessage),
}

/// User-authored content.
///
/// Exactly one of "text", "attached file" or "excluded file" is produced by
/// the classifier; continuation lines land in `continued_text` until the
/// sanitizer folds them away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessage {
    /// Text content including its line terminator.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub text: Option<String>,

    /// Raw continuation lines (pre-sanitization only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub continued_text: Option<String>,

    /// Name of the attached file.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub filename: Option<String>,

    /// The message references a media file.
    #[serde(default)]
    pub file: bool,

    /// The referenced media was excluded from the export.
    #[serde(default)]
    pub file_lost: bool,
}

impl RoomMessage {
    /// Plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Message with an attached file.
    pub fn attached(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            file: true,
            ..Self::default()
        }
    }

    /// Message whose media was left out of the export.
    pub fn excluded() -> Self {
        Self {
            file: true,
            file_lost: true,
            ..Self::default()
        }
    }

    /// Builder-style method to set the continuation segments.
    #[must_use]
    pub fn with_continued_text(mut self, continued: impl Into<String>) -> Self {
        self.continued_text = Some(continued.into());
        self
    }

    /// Returns `true` if there is non-empty continuation text left.
    pub fn has_continuation(&self) -> bool {
        self.continued_text.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Checks the file invariants.
    ///
    /// - `file_lost` implies `file` and no `filename`
    /// - `file` without `file_lost` requires a `filename`
    pub fn validate(&self) -> Result<()> {
        if self.file_lost && !self.file {
            return Err(ChatvaultError::invalid_record(
                "file_lost is set on a message without a file",
            ));
        }
        if self.file_lost && self.filename.is_some() {
            return Err(ChatvaultError::invalid_record(
                "file_lost is set on a message that still names its file",
            ));
        }
        if self.file && !self.file_lost && self.filename.is_none() {
            return Err(ChatvaultError::invalid_record(
                "file is set without a filename and without file_lost",
            ));
        }
        Ok(())
    }
}

/// Platform-issued notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    /// Which phrase was recognized.
    pub event: SystemEvent,

    /// The other party of a join/kick notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub target: Option<String>,

    /// Room name set by a create/rename notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub new_room_name: Option<String>,

    /// Phone number announced by a number-change notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub new_number: Option<String>,
}

impl SystemMessage {
    /// Notice with no optional fields.
    pub fn new(event: SystemEvent) -> Self {
        Self {
            event,
            target: None,
            new_room_name: None,
            new_number: None,
        }
    }
}

/// Closed set of recognized system notices.
///
/// Naming: `Self` is the user who exported the chat, `ThirdParty` anyone else,
/// `Unknown` an actor the log does not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    RoomCreateBySelf,
    RoomCreateByThirdParty,
    RoomJoinThirdPartyByThirdParty,
    RoomJoinThirdPartyByUnknown,
    RoomJoinSelfByThirdParty,
    RoomJoinThirdPartyBySelf,
    RoomKickThirdPartyByThirdParty,
    RoomKickThirdPartyByUnknown,
    RoomKickSelfByThirdParty,
    RoomKickThirdPartyBySelf,
    RoomLeaveThirdParty,
    RoomLeaveSelf,
    RoomNameBySelf,
    RoomNameByThirdParty,
    RoomDescriptionBySelf,
    RoomDescriptionByThirdParty,
    RoomAvatarChangeBySelf,
    RoomAvatarChangeByThirdParty,
    RoomAvatarDeleteBySelf,
    RoomAvatarDeleteByThirdParty,
    RoomNumberChangeWithNumber,
    RoomNumberChangeWithoutNumber,
    RoomAdminPromotion,
    EndToEndEncryption,
    /// A header line no catalog phrase matched (degrade policy only).
    Unrecognized,
}

impl SystemEvent {
    /// Stable snake_case tag, used as the suffix of the message type column.
    pub fn tag(self) -> &'static str {
        match self {
            SystemEvent::RoomCreateBySelf => "room_create_by_self",
            SystemEvent::RoomCreateByThirdParty => "room_create_by_third_party",
            SystemEvent::RoomJoinThirdPartyByThirdParty => "room_join_third_party_by_third_party",
            SystemEvent::RoomJoinThirdPartyByUnknown => "room_join_third_party_by_unknown",
            SystemEvent::RoomJoinSelfByThirdParty => "room_join_self_by_third_party",
            SystemEvent::RoomJoinThirdPartyBySelf => "room_join_third_party_by_self",
            SystemEvent::RoomKickThirdPartyByThirdParty => "room_kick_third_party_by_third_party",
            SystemEvent::RoomKickThirdPartyByUnknown => "room_kick_third_party_by_unknown",
            SystemEvent::RoomKickSelfByThirdParty => "room_kick_self_by_third_party",
            SystemEvent::RoomKickThirdPartyBySelf => "room_kick_third_party_by_self",
            SystemEvent::RoomLeaveThirdParty => "room_leave_third_party",
            SystemEvent::RoomLeaveSelf => "room_leave_self",
            SystemEvent::RoomNameBySelf => "room_name_by_self",
            SystemEvent::RoomNameByThirdParty => "room_name_by_third_party",
            SystemEvent::RoomDescriptionBySelf => "room_description_by_self",
            SystemEvent::RoomDescriptionByThirdParty => "room_description_by_third_party",
            SystemEvent::RoomAvatarChangeBySelf => "room_avatar_change_by_self",
            SystemEvent::RoomAvatarChangeByThirdParty => "room_avatar_change_by_third_party",
            SystemEvent::RoomAvatarDeleteBySelf => "room_avatar_delete_by_self",
            SystemEvent::RoomAvatarDeleteByThirdParty => "room_avatar_delete_by_third_party",
            SystemEvent::RoomNumberChangeWithNumber => "room_number_change_with_number",
            SystemEvent::RoomNumberChangeWithoutNumber => "room_number_change_without_number",
            SystemEvent::RoomAdminPromotion => "room_admin_promotion",
            SystemEvent::EndToEndEncryption => "end_to_end_encryption",
            SystemEvent::Unrecognized => "unrecognized",
        }
    }

    /// Optional columns this notice populates.
    pub fn capabilities(self) -> Capabilities {
        match self {
            SystemEvent::RoomJoinThirdPartyByThirdParty
            | SystemEvent::RoomJoinThirdPartyByUnknown
            | SystemEvent::RoomJoinThirdPartyBySelf
            | SystemEvent::RoomKickThirdPartyByThirdParty
            | SystemEvent::RoomKickThirdPartyByUnknown
            | SystemEvent::RoomKickThirdPartyBySelf => Capabilities::HAS_TARGET_USER,
            SystemEvent::RoomCreateBySelf
            | SystemEvent::RoomCreateByThirdParty
            | SystemEvent::RoomNameBySelf
            | SystemEvent::RoomNameByThirdParty => Capabilities::HAS_NEW_ROOM_NAME,
            SystemEvent::RoomNumberChangeWithNumber => Capabilities::HAS_NEW_NUMBER,
            _ => Capabilities::empty(),
        }
    }

    /// Returns `true` for the notices that open a group room.
    pub fn is_room_creation(self) -> bool {
        matches!(
            self,
            SystemEvent::RoomCreateBySelf | SystemEvent::RoomCreateByThirdParty
        )
    }

    /// Returns all recognized variants (excluding [`Unrecognized`](Self::Unrecognized)).
    pub fn all() -> &'static [SystemEvent] {
        &[
            SystemEvent::RoomCreateBySelf,
            SystemEvent::RoomCreateByThirdParty,
            SystemEvent::RoomJoinThirdPartyByThirdParty,
            SystemEvent::RoomJoinThirdPartyByUnknown,
            SystemEvent::RoomJoinSelfByThirdParty,
            SystemEvent::RoomJoinThirdPartyBySelf,
            SystemEvent::RoomKickThirdPartyByThirdParty,
            SystemEvent::RoomKickThirdPartyByUnknown,
            SystemEvent::RoomKickSelfByThirdParty,
            SystemEvent::RoomKickThirdPartyBySelf,
            SystemEvent::RoomLeaveThirdParty,
            SystemEvent::RoomLeaveSelf,
            SystemEvent::RoomNameBySelf,
            SystemEvent::RoomNameByThirdParty,
            SystemEvent::RoomDescriptionBySelf,
            SystemEvent::RoomDescriptionByThirdParty,
            SystemEvent::RoomAvatarChangeBySelf,
            SystemEvent::RoomAvatarChangeByThirdParty,
            SystemEvent::RoomAvatarDeleteBySelf,
            SystemEvent::RoomAvatarDeleteByThirdParty,
            SystemEvent::RoomNumberChangeWithNumber,
            SystemEvent::RoomNumberChangeWithoutNumber,
            SystemEvent::RoomAdminPromotion,
            SystemEvent::EndToEndEncryption,
        ]
    }
}

impl std::fmt::Display for SystemEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl Record {
    /// Creates a user-authored record.
    pub fn user(
        timestamp: Timestamp,
        full_text: impl Into<String>,
        sender: impl Into<String>,
        message: RoomMessage,
    ) -> Self {
        Self {
            timestamp,
            full_text: full_text.into(),
            sender: Some(sender.into()),
            room_name: None,
            body: RecordBody::User(message),
        }
    }

    /// Creates a system notice.
    pub fn system(
        timestamp: Timestamp,
        full_text: impl Into<String>,
        sender: Option<String>,
        message: SystemMessage,
    ) -> Self {
        Self {
            timestamp,
            full_text: full_text.into(),
            sender,
            room_name: None,
            body: RecordBody::System(message),
        }
    }

    /// Builder-style method to set the room name.
    #[must_use]
    pub fn with_room_name(mut self, room_name: impl Into<String>) -> Self {
        self.room_name = Some(room_name.into());
        self
    }

    /// Returns the sender name, if any.
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Returns the target name of a join/kick notice, if any.
    pub fn target(&self) -> Option<&str> {
        match &self.body {
            RecordBody::System(sys) => sys.target.as_deref(),
            RecordBody::User(_) => None,
        }
    }

    /// Returns the user content, if this is a user message.
    pub fn as_room_message(&self) -> Option<&RoomMessage> {
        match &self.body {
            RecordBody::User(msg) => Some(msg),
            RecordBody::System(_) => None,
        }
    }

    /// Returns the notice, if this is a system message.
    pub fn as_system_message(&self) -> Option<&SystemMessage> {
        match &self.body {
            RecordBody::System(sys) => Some(sys),
            RecordBody::User(_) => None,
        }
    }

    /// Returns the system event kind, if this is a system message.
    pub fn event(&self) -> Option<SystemEvent> {
        self.as_system_message().map(|sys| sys.event)
    }

    /// Optional columns this record populates.
    pub fn capabilities(&self) -> Capabilities {
        self.event()
            .map(SystemEvent::capabilities)
            .unwrap_or_default()
    }

    /// Returns `true` if this record opens a group room.
    pub fn is_room_creation(&self) -> bool {
        self.event().is_some_and(SystemEvent::is_room_creation)
    }

    /// Stable snake_case tag of the record variant.
    pub fn tag(&self) -> &'static str {
        match &self.body {
            RecordBody::User(_) => "room_message",
            RecordBody::System(sys) => sys.event.tag(),
        }
    }
}
