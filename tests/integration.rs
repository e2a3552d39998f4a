//! Integration tests running whole exports through the pipeline

use chatvault::core::output::{JsonlSink, MemorySink};
use chatvault::prelude::*;
use chrono::{FixedOffset, TimeZone};
use std::collections::HashSet;
use std::fs;
use tempfile::{TempDir, tempdir};

const GROUP_CHAT: &str = "\
16.01.21, 23:00 - Nachrichten und Anrufe sind Ende-zu-Ende-verschlüsselt. Niemand außerhalb dieses Chats kann sie lesen.
16.01.21, 23:00 - Anna hat die Gruppe „Eiergilde“ erstellt
16.01.21, 23:00 - Anna hat dich hinzugefügt
16.01.21, 23:01 - Anna hat \u{200e}Ben hinzugefügt
16.01.21, 23:05 - Anna: Willkommen!
Schön, dass ihr da seid.
16.01.21, 23:07 - \u{200e}Ben: IMG-20210116-WA0001.jpg (Datei angehängt)
Unser Huhn
16.01.21, 23:08 - Ben: <Medien ausgeschlossen>
16.01.21, 23:09 - Anna hat den Gruppennamen von „Eiergilde“ zu „Eierbande“ geändert
16.01.21, 23:10 - Ben hat die Gruppe verlassen
";

const DIRECT_CHAT: &str = "\
16.01.21, 22:00 - Nachrichten und Anrufe sind Ende-zu-Ende-verschlüsselt.
16.01.21, 22:01 - Anna: Hast du die Eier?
16.01.21, 22:02 - Carl: Ja
";

fn cet(day: u32, hour: u32, minute: u32) -> Timestamp {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2021, 1, day, hour, minute, 0)
        .unwrap()
}

fn fixtures() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("WhatsApp Chat mit Eierbande.txt"), GROUP_CHAT).unwrap();
    fs::write(dir.path().join("WhatsApp Chat mit Carl.txt"), DIRECT_CHAT).unwrap();
    fs::write(dir.path().join("IMG-20210116-WA0001.jpg"), [0xff, 0xd8]).unwrap();
    dir
}

fn parse(text: &str) -> Vec<Record> {
    sanitize(LogParser::new().parse_str(text).unwrap())
}

// ============================================================================
// End-to-end examples
// ============================================================================

#[test]
fn test_plain_message() {
    let records = parse("16.01.21, 23:09 - John Doe: Hi there\n");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.timestamp, cet(16, 23, 9));
    assert_eq!(record.sender(), Some("John Doe"));
    assert_eq!(
        record.as_room_message().unwrap().text.as_deref(),
        Some("Hi there\n")
    );
}

#[test]
fn test_attachment_without_caption() {
    let records = parse("16.01.21, 23:11 - John Doe: abcdefgh.jpg (Datei angehängt)\n");
    assert_eq!(records.len(), 1);

    let msg = records[0].as_room_message().unwrap();
    assert!(msg.file);
    assert_eq!(msg.filename.as_deref(), Some("abcdefgh.jpg"));
    assert_eq!(msg.text, None);
}

#[test]
fn test_attachment_caption_is_split() {
    let records = parse("16.01.21, 23:14 - John Doe: abcdefgh.jpg (Datei angehängt)\nSee this.\n");
    assert_eq!(records.len(), 2);

    let file = records[0].as_room_message().unwrap();
    assert!(file.file);
    assert_eq!(file.filename.as_deref(), Some("abcdefgh.jpg"));
    assert_eq!(file.text, None);

    let caption = records[1].as_room_message().unwrap();
    assert!(!caption.file);
    assert_eq!(caption.filename, None);
    assert_eq!(caption.text.as_deref(), Some("See this.\n"));

    assert_eq!(records[0].sender(), Some("John Doe"));
    assert_eq!(records[1].sender(), Some("John Doe"));
    assert_eq!(records[0].timestamp, records[1].timestamp);
}

#[test]
fn test_room_created_by_third_party() {
    let records = parse("16.01.21, 23:00 - Anna hat die Gruppe „Eiergilde“ erstellt\n");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.event(), Some(SystemEvent::RoomCreateByThirdParty));
    assert_eq!(record.sender(), Some("Anna"));
    assert_eq!(
        record.as_system_message().unwrap().new_room_name.as_deref(),
        Some("Eiergilde")
    );
    assert!(record.is_room_creation());
}

// ============================================================================
// Whole rooms
// ============================================================================

#[test]
fn test_group_chat_records() {
    let records = parse(GROUP_CHAT);
    let tags: Vec<&str> = records.iter().map(Record::tag).collect();
    assert_eq!(
        tags,
        vec![
            "end_to_end_encryption",
            "room_create_by_third_party",
            "room_join_self_by_third_party",
            "room_join_third_party_by_third_party",
            "room_message",
            "room_message",
            "room_message",
            "room_message",
            "room_name_by_third_party",
            "room_leave_third_party",
        ]
    );

    assert_eq!(records[3].target(), Some("Ben"));
    assert_eq!(
        records[4].as_room_message().unwrap().text.as_deref(),
        Some("Willkommen!\nSchön, dass ihr da seid.\n")
    );
    assert_eq!(records[5].sender(), Some("Ben"));
    assert!(records[7].as_room_message().unwrap().file_lost);
}

#[test]
fn test_group_chat_assembly() {
    let records = parse(GROUP_CHAT);
    let system = SystemSender::generate();
    let room = assemble_room(
        &records,
        "Eierbande",
        &SenderTable::new(),
        &system,
        &AssemblerConfig::default(),
    )
    .unwrap()
    .unwrap();

    // Encryption notice comes first, so the room is not recognized as a group.
    assert!(room.room.is_dm);
    assert_eq!(room.messages.len(), records.len());
    assert_eq!(room.links.len(), records.len() - 1);
    assert_eq!(room.room.first_message_id, room.messages[0].id);
    assert_eq!(room.room.member_count, 2);
    assert_eq!(room.senders.len(), 2);
    assert_eq!(room.files.len(), 2);

    assert_eq!(room.messages[0].sender_id, system.id());
    let ben = room.senders.iter().find(|s| s.name == "Ben").unwrap().id;
    assert_eq!(room.messages[3].target_user_id, Some(ben));
    assert_eq!(room.messages[5].sender_id, ben);
    assert_eq!(room.messages[7].sender_id, ben);
    assert_eq!(room.messages[8].new_room_name.as_deref(), Some("Eierbande"));
    assert_eq!(room.messages[9].variant_tag, "chatvault.room_leave_third_party");
}

#[test]
fn test_room_starting_with_creation_is_group() {
    let text = GROUP_CHAT.lines().skip(1).collect::<Vec<_>>().join("\n") + "\n";
    let room = assemble_room(
        &parse(&text),
        "Eierbande",
        &SenderTable::new(),
        &SystemSender::generate(),
        &AssemblerConfig::default(),
    )
    .unwrap()
    .unwrap();
    assert!(!room.room.is_dm);
}

#[test]
fn test_chain_is_unbroken() {
    let room = assemble_room(
        &parse(GROUP_CHAT),
        "Eierbande",
        &SenderTable::new(),
        &SystemSender::generate(),
        &AssemblerConfig::default(),
    )
    .unwrap()
    .unwrap();

    for (depth, message) in room.messages.iter().enumerate() {
        assert_eq!(message.depth, depth + 1);
    }
    for (link, pair) in room.links.iter().zip(room.messages.windows(2)) {
        assert_eq!(link.parent_message_id, pair[0].id);
        assert_eq!(link.message_id, pair[1].id);
    }
}

// ============================================================================
// Batch import
// ============================================================================

#[test]
fn test_import_directory() {
    let dir = fixtures();
    let locale = LocaleId::DeDe.locale();
    let sources: Vec<RoomSource> = discover_chat_files(dir.path(), locale)
        .unwrap()
        .into_iter()
        .map(|path| RoomSource::from_path(path, locale))
        .collect();
    assert_eq!(sources.len(), 2);

    let mut importer = Importer::new(MemorySink::new());
    let report = importer.import(&sources).unwrap();
    assert!(report.is_success());

    // Sorted by file name: Carl before Eierbande
    let names: Vec<&str> = report.rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Carl", "Eierbande"]);

    let rooms = importer.sink().rooms();
    let anna_ids: HashSet<_> = rooms
        .iter()
        .flat_map(|room| room.senders.iter())
        .filter(|s| s.name == "Anna")
        .map(|s| s.id)
        .collect();
    assert_eq!(anna_ids.len(), 1);
    assert_eq!(importer.senders().len(), 3);
    assert_eq!(report.rooms[1].new_senders, 1);
}

#[test]
fn test_import_with_seeded_senders() {
    let known = uuid::Uuid::new_v4();
    let table = SenderTable::seeded([("Anna".to_string(), known)]);

    let mut importer = Importer::new(MemorySink::new()).with_senders(table);
    importer
        .import(&[RoomSource::from_string("Carl", DIRECT_CHAT)])
        .unwrap();

    let room = &importer.sink().rooms()[0];
    assert_eq!(room.messages[1].sender_id, known);
    assert_eq!(room.senders.len(), 1);
    assert_eq!(room.senders[0].name, "Carl");
}

#[test]
fn test_import_jsonl_file() {
    let dir = fixtures();
    let output = dir.path().join("messages.jsonl");
    let locale = LocaleId::DeDe.locale();
    let sources: Vec<RoomSource> = discover_chat_files(dir.path(), locale)
        .unwrap()
        .into_iter()
        .map(|path| RoomSource::from_path(path, locale))
        .collect();

    let mut importer = Importer::new(JsonlSink::create(&output).unwrap());
    importer.import(&sources).unwrap();
    drop(importer);

    let content = fs::read_to_string(&output).unwrap();
    let rows: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(rows[0]["table"], "sender");
    assert_eq!(rows[0]["name"], "WhatsApp System");
    assert_eq!(rows.iter().filter(|r| r["table"] == "room").count(), 2);
    assert_eq!(rows.iter().filter(|r| r["table"] == "file").count(), 2);
}

#[test]
fn test_strict_import_fails_unknown_event() {
    let text = "16.01.21, 23:00 - Anna hat die Gruppe „Eiergilde“ erstellt\n\
                16.01.21, 23:01 - Anna hat etwas völlig Neues getan\n";

    let lenient = sanitize(LogParser::new().parse_str(text).unwrap());
    assert_eq!(lenient[1].event(), Some(SystemEvent::Unrecognized));
    assert_eq!(lenient[1].sender(), None);

    let config = ImportConfig::new().with_parser(ParserConfig::strict());
    let mut importer = Importer::new(MemorySink::new()).with_config(config);
    let report = importer
        .import(&[RoomSource::from_string("Eiergilde", text)])
        .unwrap();
    assert!(report.failures[0].error.is_unrecognized_event());
    assert!(importer.sink().rooms().is_empty());
}

#[test]
fn test_crlf_export() {
    let records = parse("16.01.21, 23:09 - Anna: Hi\r\n16.01.21, 23:10 - Anna hat die Gruppe verlassen\r\n");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].event(), Some(SystemEvent::RoomLeaveThirdParty));
}
