//! Cleans reducer output before assembly.
//!
//! Per record, in order:
//!
//! 1. A leading U+200E (left-to-right mark) is stripped from sender and
//!    target names.
//! 2. Continuation text of a file message becomes its own text message right
//!    after it, with the same timestamp and sender.
//! 3. Any other continuation text is appended to the message text.
//!
//! The result has no `continued_text` left, so sanitizing twice is the same
//! as sanitizing once.

use tracing::debug;

use crate::message::{Record, RecordBody, RoomMessage};

pub(crate) const LEFT_TO_RIGHT_MARK: char = '\u{200e}';

/// Sanitizes a whole record list, keeping file order.
///
/// A split record is replaced in place by its two halves.
pub fn sanitize(records: Vec<Record>) -> Vec<Record> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let (first, split) = sanitize_record(record);
        out.push(first);
        out.extend(split);
    }
    out
}

/// Sanitizes one record.
///
/// Returns the cleaned record and, for a file message with continuation
/// text, the text message split off it.
///
/// # Example
///
/// ```
/// use chatvault::core::sanitizer::sanitize_record;
/// use chatvault::message::{Record, RoomMessage};
/// use chatvault::parsing::timestamp::parse_timestamp;
///
/// let ts = parse_timestamp("16", "01", "21", "23", "14")?;
/// let raw = Record::user(
///     ts,
///     "16.01.21, 23:14 - John Doe: a.jpg (Datei angehängt)\nSee this.\n",
///     "John Doe",
///     RoomMessage::attached("a.jpg").with_continued_text("See this.\n"),
/// );
///
/// let (file, text) = sanitize_record(raw);
/// let text = text.unwrap();
/// assert!(file.as_room_message().unwrap().file);
/// assert_eq!(text.as_room_message().unwrap().text.as_deref(), Some("See this.\n"));
/// assert_eq!(text.sender(), Some("John Doe"));
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
pub fn sanitize_record(mut record: Record) -> (Record, Option<Record>) {
    if let Some(sender) = record.sender.as_mut() {
        strip_mark(sender);
    }

    match &mut record.body {
        RecordBody::System(sys) => {
            if let Some(target) = sys.target.as_mut() {
                strip_mark(target);
            }
            (record, None)
        }
        RecordBody::User(msg) => {
            let continued = msg.continued_text.take().filter(|c| !c.is_empty());
            match continued {
                Some(continued) if msg.file => {
                    let split = split_off_text(&mut record, continued);
                    (record, Some(split))
                }
                Some(continued) => {
                    msg.text.get_or_insert_with(String::new).push_str(&continued);
                    (record, None)
                }
                None => (record, None),
            }
        }
    }
}

/// Splits the continuation of a file message into its own record.
///
/// The verbatim source span is divided between the two records.
fn split_off_text(record: &mut Record, continued: String) -> Record {
    debug!(
        sender = record.sender(),
        timestamp = %record.timestamp,
        "splitting text off a file message"
    );

    let full_text = match record.full_text.strip_suffix(continued.as_str()) {
        Some(header) => {
            let text_span = continued.clone();
            record.full_text = header.to_string();
            text_span
        }
        None => record.full_text.clone(),
    };

    Record {
        timestamp: record.timestamp,
        full_text,
        sender: record.sender.clone(),
        room_name: record.room_name.clone(),
        body: RecordBody::User(RoomMessage::text(continued)),
    }
}

fn strip_mark(name: &mut String) {
    let stripped = name.trim_start_matches(LEFT_TO_RIGHT_MARK);
    if stripped.len() != name.len() {
        *name = stripped.to_string();
    }
}
