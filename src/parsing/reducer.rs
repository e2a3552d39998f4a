//! Reduces a [`LogTree`] to typed records.
//!
//! One [`Record`] per unit, in file order. Continuation lines of a user
//! message are kept apart in `continued_text` for the sanitizer; those of a
//! system notice only extend its `full_text`.

use tracing::{debug, warn};

use super::catalog::EventMatch;
use super::grammar::{HeaderKind, LogTree, Unit, UserContent};
use crate::config::{ParserConfig, UnknownEventPolicy};
use crate::error::{ChatvaultError, Result};
use crate::message::{Record, RoomMessage, SystemEvent, SystemMessage};

/// Turns every unit of `tree` into a [`Record`].
///
/// # Errors
///
/// Returns [`ChatvaultError::UnrecognizedEvent`] for the first header that
/// matches no catalog phrase when the policy is
/// [`UnknownEventPolicy::Fail`]. The error carries no path; callers that know
/// the file attach it with [`ChatvaultError::with_path`].
pub fn reduce(tree: LogTree<'_>, config: &ParserConfig) -> Result<Vec<Record>> {
    tree.units()
        .iter()
        .map(|unit| reduce_unit(unit, config.unknown_events))
        .collect()
}

fn reduce_unit(unit: &Unit<'_>, policy: UnknownEventPolicy) -> Result<Record> {
    let full_text = terminated(unit.full_text());

    match &unit.kind {
        HeaderKind::User { username, content } => {
            let mut message = match *content {
                UserContent::Attached(filename) => RoomMessage::attached(filename),
                UserContent::Excluded => RoomMessage::excluded(),
                UserContent::Text(text) => RoomMessage::text(terminated(text.to_string())),
            };
            message.continued_text = unit.continued_text().map(terminated);
            Ok(Record::user(unit.timestamp, full_text, *username, message))
        }
        HeaderKind::System(found) => {
            if !unit.continuation.is_empty() {
                debug!(
                    line = unit.line,
                    event = %found.event,
                    lines = unit.continuation.len(),
                    "continuation after system event folded into full_text"
                );
            }
            Ok(system_record(unit, found, full_text))
        }
        HeaderKind::Unrecognized(text) => match policy {
            UnknownEventPolicy::Degrade => {
                warn!(line = unit.line, text = %text, "unrecognized system event");
                Ok(Record::system(
                    unit.timestamp,
                    full_text,
                    None,
                    SystemMessage::new(SystemEvent::Unrecognized),
                ))
            }
            UnknownEventPolicy::Fail => Err(ChatvaultError::UnrecognizedEvent {
                path: None,
                line: unit.line,
                text: (*text).to_string(),
            }),
        },
    }
}

fn system_record(unit: &Unit<'_>, found: &EventMatch<'_>, full_text: String) -> Record {
    let captures = &found.captures;
    let message = SystemMessage {
        event: found.event,
        target: captures.target.map(str::to_string),
        new_room_name: captures.new_room_name.map(str::to_string),
        new_number: captures.new_number.map(str::to_string),
    };
    Record::system(
        unit.timestamp,
        full_text,
        captures.sender.map(str::to_string),
        message,
    )
}

/// Appends the implicit terminator of an unterminated last line.
fn terminated(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
