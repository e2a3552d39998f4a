//! Structural grammar of a chat log.
//!
//! ```text
//! log          := message+ EOF
//! message      := header continuation*
//! header       := timestamp " - " (system_event | user_header) EOL
//! timestamp    := DD "." MM "." YY ", " HH ":" MM
//! user_header  := username ": " (file_attached | file_excluded | text)
//! continuation := !(timestamp " - ") line
//! ```
//!
//! [`parse_structure`] walks the text line by line and returns a [`LogTree`]
//! of borrowed spans. Every header is already classified here, so the
//! reducer only has to turn spans into owned records.

use std::borrow::Cow;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::catalog::{EventMatch, Locale};
use super::timestamp::parse_timestamp;
use crate::error::GrammarMismatch;
use crate::message::Timestamp;

/// `DD.MM.YY, HH:MM - ` at the start of a line.
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})\.([0-9]{2})\.([0-9]{2}), ([0-9]{2}):([0-9]{2}) - ").unwrap()
});

/// An attachment name needs an extension.
static FILENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+\.\w+$").unwrap());

const USER_SEPARATOR: &str = ": ";

/// Structural parse of one complete log.
#[derive(Debug, Clone, Default)]
pub struct LogTree<'a> {
    units: Vec<Unit<'a>>,
}

impl<'a> LogTree<'a> {
    /// Units in file order.
    pub fn units(&self) -> &[Unit<'a>] {
        &self.units
    }

    /// Consumes the tree, returning its units.
    pub fn into_units(self) -> Vec<Unit<'a>> {
        self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// One header line with the continuation lines that follow it.
#[derive(Debug, Clone)]
pub struct Unit<'a> {
    /// 1-based line number of the header
    pub line: usize,
    pub timestamp: Timestamp,
    /// The header line, terminator included
    pub header: &'a str,
    pub kind: HeaderKind<'a>,
    /// Following lines without a header of their own, terminators included
    pub continuation: Vec<&'a str>,
}

impl Unit<'_> {
    /// Concatenated continuation lines, or `None` if there are none.
    pub fn continued_text(&self) -> Option<String> {
        if self.continuation.is_empty() {
            None
        } else {
            Some(self.continuation.concat())
        }
    }

    /// Header plus continuation, verbatim.
    pub fn full_text(&self) -> String {
        let mut full = String::with_capacity(
            self.header.len() + self.continuation.iter().map(|l| l.len()).sum::<usize>(),
        );
        full.push_str(self.header);
        for line in &self.continuation {
            full.push_str(line);
        }
        full
    }
}

/// What follows the timestamp of a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderKind<'a> {
    /// A catalog phrase matched.
    System(EventMatch<'a>),
    /// `username: content`
    User {
        username: &'a str,
        content: UserContent<'a>,
    },
    /// Neither a catalog phrase nor a user header; the raw event text.
    Unrecognized(&'a str),
}

/// Content of a user header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserContent<'a> {
    /// `name.ext` followed by the locale's attachment suffix
    Attached(&'a str),
    /// A "media omitted" marker
    Excluded,
    /// Free text, terminator included
    Text(&'a str),
}

/// Prepares raw export text for [`parse_structure`].
///
/// Strips a leading byte-order mark and appends a line terminator if the
/// text does not end with one. Borrows when nothing needs to change.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.is_empty() || text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    }
}

/// Returns `true` if `line` starts with a header timestamp and separator.
///
/// This is the lookahead that ends a run of continuation lines. It checks
/// the shape only; calendar validity is checked when the header is parsed.
pub fn is_header(line: &str) -> bool {
    HEADER.is_match(line)
}

/// Parses a complete log into units.
///
/// Blank lines before the first header are skipped; any other text there has
/// nothing to continue and fails the parse, as does a header-shaped line whose
/// fields are not a calendar minute. An empty input yields an empty tree.
///
/// Input should come through [`normalize`]; a last line without terminator is
/// still accepted.
pub fn parse_structure<'a>(text: &'a str, locale: &dyn Locale) -> Result<LogTree<'a>, GrammarMismatch> {
    let mut units: Vec<Unit<'a>> = Vec::new();
    let mut offset = 0;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let line_no = index + 1;

        if let Some(caps) = HEADER.captures(line) {
            let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            let timestamp = parse_timestamp(field(1), field(2), field(3), field(4), field(5)).map_err(|_| {
                // fields are ASCII digits, so bytes and characters agree
                let start = rejected_field(&caps);
                mismatch(line_no, start + 1, offset + start, "valid date and time", line)
            })?;
            let prefix_len = caps.get(0).map_or(0, |m| m.end());

            units.push(Unit {
                line: line_no,
                timestamp,
                header: line,
                kind: classify_header(&line[prefix_len..], locale),
                continuation: Vec::new(),
            });
        } else if let Some(unit) = units.last_mut() {
            unit.continuation.push(line);
        } else if !line.trim().is_empty() {
            return Err(mismatch(line_no, 1, offset, "message header", line));
        }

        offset += line.len();
    }

    Ok(LogTree { units })
}

/// Classifies what follows `" - "` on a header line.
///
/// Catalog phrases are tried first; catalog names never contain `": "`, so a
/// user line can only match a phrase that starts at the line start.
fn classify_header<'a>(rest: &'a str, locale: &dyn Locale) -> HeaderKind<'a> {
    let content = strip_terminator(rest);

    if let Some(found) = locale.catalog().classify(content) {
        return HeaderKind::System(found);
    }

    let Some(split) = content.find(USER_SEPARATOR) else {
        return HeaderKind::Unrecognized(content);
    };
    let username = &content[..split];
    let body = &content[split + USER_SEPARATOR.len()..];

    let content = if locale.file_excluded_markers().contains(&body) {
        UserContent::Excluded
    } else if let Some(filename) = body
        .strip_suffix(locale.file_attached_suffix())
        .filter(|name| FILENAME.is_match(name))
    {
        UserContent::Attached(filename)
    } else {
        UserContent::Text(&rest[split + USER_SEPARATOR.len()..])
    };

    HeaderKind::User { username, content }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Byte position of the first timestamp field group that is not a calendar
/// value: the date, or the time if the date is fine.
fn rejected_field(caps: &Captures<'_>) -> usize {
    let field = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    let year = 2000 + i32::try_from(field(3)).unwrap_or(0);
    let group = if NaiveDate::from_ymd_opt(year, field(2), field(1)).is_some() {
        4
    } else {
        1
    };
    caps.get(group).map_or(0, |m| m.start())
}

fn mismatch(line: usize, column: usize, offset: usize, expected: &'static str, found: &str) -> GrammarMismatch {
    GrammarMismatch {
        line,
        column,
        offset,
        expected,
        found: strip_terminator(found).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::SystemEvent;
    use crate::parsing::german::German;

    fn parse(text: &str) -> LogTree<'_> {
        parse_structure(text, &German).unwrap()
    }

    #[test]
    fn test_user_text() {
        let tree = parse("16.01.21, 23:09 - John Doe: Hi there\n");
        assert_eq!(tree.len(), 1);
        let unit = &tree.units()[0];
        assert_eq!(unit.line, 1);
        assert_eq!(
            unit.kind,
            HeaderKind::User {
                username: "John Doe",
                content: UserContent::Text("Hi there\n"),
            }
        );
        assert!(unit.continuation.is_empty());
    }

    #[test]
    fn test_username_may_contain_colons() {
        let tree = parse("16.01.21, 23:09 - Dr.:Who: Hi: there\n");
        let HeaderKind::User { username, content } = &tree.units()[0].kind else {
            panic!("expected user header");
        };
        assert_eq!(*username, "Dr.:Who");
        assert_eq!(*content, UserContent::Text("Hi: there\n"));
    }

    #[test]
    fn test_attachment_and_exclusion() {
        let tree = parse(
            "16.01.21, 23:11 - John Doe: abcdefgh.jpg (Datei angehängt)\n\
             16.01.21, 23:12 - John Doe: <Medien ausgeschlossen>\n\
             16.01.21, 23:13 - John Doe: <Media omitted>\n\
             16.01.21, 23:14 - John Doe: noext (Datei angehängt)\n",
        );
        let contents: Vec<_> = tree
            .units()
            .iter()
            .map(|u| match &u.kind {
                HeaderKind::User { content, .. } => *content,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(contents[0], UserContent::Attached("abcdefgh.jpg"));
        assert_eq!(contents[1], UserContent::Excluded);
        assert_eq!(contents[2], UserContent::Excluded);
        assert_eq!(contents[3], UserContent::Text("noext (Datei angehängt)\n"));
    }

    #[test]
    fn test_continuation_lines() {
        let tree = parse(
            "16.01.21, 23:14 - John Doe: first\n\
             second\n\
             \n\
             third\n\
             16.01.21, 23:15 - Jane: next\n",
        );
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.units()[0].continuation, vec!["second\n", "\n", "third\n"]);
        assert_eq!(tree.units()[0].continued_text().as_deref(), Some("second\n\nthird\n"));
        assert_eq!(tree.units()[1].line, 5);
    }

    #[test]
    fn test_header_shaped_line_always_starts_a_unit() {
        let tree = parse("16.01.21, 23:14 - A: x\n16.01.21, 23:15 - B: y\n");
        assert_eq!(tree.len(), 2);
        assert!(tree.units()[0].continuation.is_empty());
    }

    #[test]
    fn test_system_event() {
        let tree = parse("16.01.21, 23:00 - Max hat die Gruppe „Eiergilde“ erstellt\n");
        let HeaderKind::System(found) = &tree.units()[0].kind else {
            panic!("expected system event");
        };
        assert_eq!(found.event, SystemEvent::RoomCreateByThirdParty);
        assert_eq!(found.captures.new_room_name, Some("Eiergilde"));
    }

    #[test]
    fn test_unrecognized_event() {
        let tree = parse("16.01.21, 23:00 - Die Sicherheitsnummer hat sich geändert\n");
        assert_eq!(
            tree.units()[0].kind,
            HeaderKind::Unrecognized("Die Sicherheitsnummer hat sich geändert")
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let tree = parse("16.01.21, 23:00 - Du hast die Gruppe verlassen\r\n");
        assert!(matches!(tree.units()[0].kind, HeaderKind::System(_)));
    }

    #[test]
    fn test_missing_final_terminator() {
        let tree = parse("16.01.21, 23:09 - John Doe: Hi");
        assert_eq!(tree.len(), 1);

        let normalized = normalize("16.01.21, 23:09 - John Doe: Hi");
        assert_eq!(normalized, "16.01.21, 23:09 - John Doe: Hi\n");
        let tree = parse(&normalized);
        assert!(matches!(
            tree.units()[0].kind,
            HeaderKind::User {
                content: UserContent::Text("Hi\n"),
                ..
            }
        ));
    }

    #[test]
    fn test_normalize_strips_bom_and_borrows() {
        assert!(matches!(normalize("x\n"), Cow::Borrowed("x\n")));
        assert_eq!(normalize("\u{feff}x\n"), "x\n");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_empty_and_blank_prefix() {
        assert!(parse("").is_empty());
        let tree = parse("\n  \n16.01.21, 23:09 - A: x\n");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.units()[0].line, 3);
    }

    #[test]
    fn test_text_before_first_header_is_a_mismatch() {
        let err = parse_structure("\nhello\n16.01.21, 23:09 - A: x\n", &German).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);
        assert_eq!(err.offset, 1);
        assert_eq!(err.expected, "message header");
        assert_eq!(err.found, "hello");
    }

    #[test]
    fn test_invalid_date_is_a_mismatch() {
        let err = parse_structure("16.01.21, 23:09 - A: x\n32.13.21, 25:61 - A: y\n", &German).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);
        assert_eq!(err.offset, 23);
        assert_eq!(err.expected, "valid date and time");
    }

    #[test]
    fn test_invalid_time_points_past_the_date() {
        let err = parse_structure("16.01.21, 23:09 - A: x
16.01.21, 25:00 - A: y
", &German).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 11);
        assert_eq!(err.offset, 23 + 10);
        assert_eq!(&"16.01.21, 25:00"[err.column - 1..], "25:00");
    }

    #[test]
    fn test_impossible_calendar_day_points_at_the_date() {
        let err = parse_structure("29.02.23, 12:00 - A: x
", &German).unwrap_err();
        assert_eq!((err.line, err.column, err.offset), (1, 1, 0));
    }

    #[test]
    fn test_full_text_is_verbatim() {
        let tree = parse("16.01.21, 23:09 - A: x\ny\n");
        assert_eq!(tree.units()[0].full_text(), "16.01.21, 23:09 - A: x\ny\n");
    }

    #[test]
    fn test_is_header() {
        assert!(is_header("16.01.21, 23:09 - A: x"));
        assert!(!is_header("16.01.2021, 23:09 - A: x"));
        assert!(!is_header("x 16.01.21, 23:09 - "));
    }
}
