//! German (`de_de`) export locale.
//!
//! Header lines look like `16.01.21, 23:09 - ` for every locale; this module
//! only supplies the German phrasing of system notices and media markers.

use once_cell::sync::Lazy;

use super::catalog::{EventCatalog, EventRule, Field, Locale};
use crate::message::SystemEvent;

// A participant name: anything up to the ": " that would make the line a user
// message. Lazy, since a phrase or another name always follows.
macro_rules! name {
    () => {
        r"((?:[^:\n]|:[^ \n])+?)"
    };
}

const RULES: &[EventRule] = &[
    EventRule {
        event: SystemEvent::EndToEndEncryption,
        pattern: r"Nachrichten[^:\n]*Ende-zu-Ende-(?:Verschlüsselung|verschlüsselt)[^\n]*",
        fields: &[],
    },
    EventRule {
        event: SystemEvent::RoomCreateBySelf,
        pattern: r"Du hast die Gruppe „(.+)“ erstellt\.?",
        fields: &[Field::NewRoomName],
    },
    EventRule {
        event: SystemEvent::RoomCreateByThirdParty,
        pattern: concat!(name!(), r" hat die Gruppe „(.+)“ erstellt\.?"),
        fields: &[Field::Sender, Field::NewRoomName],
    },
    EventRule {
        event: SystemEvent::RoomJoinSelfByThirdParty,
        pattern: concat!(name!(), r" hat dich hinzugefügt\.?"),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomJoinThirdPartyBySelf,
        pattern: concat!(r"Du hast ", name!(), r" hinzugefügt\.?"),
        fields: &[Field::Target],
    },
    EventRule {
        event: SystemEvent::RoomJoinThirdPartyByUnknown,
        pattern: concat!(
            name!(),
            r"(?: wurde hinzugefügt| ist über den Einladungslink dieser Gruppe beigetreten)\.?"
        ),
        fields: &[Field::Target],
    },
    EventRule {
        event: SystemEvent::RoomJoinThirdPartyByThirdParty,
        pattern: concat!(name!(), r" hat ", name!(), r" hinzugefügt\.?"),
        fields: &[Field::Sender, Field::Target],
    },
    EventRule {
        event: SystemEvent::RoomKickSelfByThirdParty,
        pattern: concat!(name!(), r" hat dich entfernt\.?"),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomKickThirdPartyBySelf,
        pattern: concat!(r"Du hast ", name!(), r" entfernt\.?"),
        fields: &[Field::Target],
    },
    EventRule {
        event: SystemEvent::RoomKickThirdPartyByUnknown,
        pattern: concat!(name!(), r" wurde entfernt\.?"),
        fields: &[Field::Target],
    },
    EventRule {
        event: SystemEvent::RoomKickThirdPartyByThirdParty,
        pattern: concat!(name!(), r" hat ", name!(), r" entfernt\.?"),
        fields: &[Field::Sender, Field::Target],
    },
    EventRule {
        event: SystemEvent::RoomLeaveSelf,
        pattern: r"Du hast die Gruppe verlassen\.?",
        fields: &[],
    },
    EventRule {
        event: SystemEvent::RoomLeaveThirdParty,
        pattern: concat!(name!(), r" hat die Gruppe verlassen\.?"),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomNameBySelf,
        pattern: r"Du hast den (?:Betreff|Gruppennamen)(?: von „.+?“)? (?:zu|in) „(.+)“ geändert\.?",
        fields: &[Field::NewRoomName],
    },
    EventRule {
        event: SystemEvent::RoomNameByThirdParty,
        pattern: concat!(
            name!(),
            r" hat den (?:Betreff|Gruppennamen)(?: von „.+?“)? (?:zu|in) „(.+)“ geändert\.?"
        ),
        fields: &[Field::Sender, Field::NewRoomName],
    },
    EventRule {
        event: SystemEvent::RoomDescriptionBySelf,
        pattern: r"Du hast die Gruppenbeschreibung geändert\.?",
        fields: &[],
    },
    EventRule {
        event: SystemEvent::RoomDescriptionByThirdParty,
        pattern: concat!(name!(), r" hat die Gruppenbeschreibung geändert\.?"),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomAvatarChangeBySelf,
        pattern: r"Du hast das Gruppenbild geändert\.?",
        fields: &[],
    },
    EventRule {
        event: SystemEvent::RoomAvatarChangeByThirdParty,
        pattern: concat!(name!(), r" hat das Gruppenbild geändert\.?"),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomAvatarDeleteBySelf,
        pattern: r"Du hast das Gruppenbild gelöscht\.?",
        fields: &[],
    },
    EventRule {
        event: SystemEvent::RoomAvatarDeleteByThirdParty,
        pattern: concat!(name!(), r" hat das Gruppenbild gelöscht\.?"),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomNumberChangeWithNumber,
        pattern: concat!(name!(), r" hat zu (\+[0-9][0-9 ()\-]*[0-9]) gewechselt\.?"),
        fields: &[Field::Sender, Field::NewNumber],
    },
    EventRule {
        event: SystemEvent::RoomNumberChangeWithoutNumber,
        pattern: concat!(
            name!(),
            r" hat (?:seine|ihre|die) Telefonnummer zu einer neuen Nummer geändert\.?[^\n]*"
        ),
        fields: &[Field::Sender],
    },
    EventRule {
        event: SystemEvent::RoomAdminPromotion,
        pattern: r"Du bist jetzt (?:ein )?Admin\.?",
        fields: &[],
    },
];

static CATALOG: Lazy<EventCatalog> = Lazy::new(|| EventCatalog::new(RULES));

/// German WhatsApp export.
#[derive(Debug, Clone, Copy, Default)]
pub struct German;

impl Locale for German {
    fn id(&self) -> &'static str {
        "de_de"
    }

    fn file_attached_suffix(&self) -> &'static str {
        " (Datei angehängt)"
    }

    fn file_excluded_markers(&self) -> &'static [&'static str] {
        &["<Medien ausgeschlossen>", "<Media omitted>"]
    }

    fn catalog(&self) -> &EventCatalog {
        &CATALOG
    }

    fn chat_file_prefix(&self) -> &'static str {
        "WhatsApp Chat mit "
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<SystemEvent> {
        German.catalog().classify(text).map(|m| m.event)
    }

    #[test]
    fn test_catalog_covers_every_event_once() {
        let events: Vec<_> = German.catalog().rules().map(|r| r.event).collect();
        assert_eq!(events.len(), SystemEvent::all().len());
        for event in SystemEvent::all() {
            assert!(events.contains(event), "{event} has no rule");
        }
    }

    #[test]
    fn test_encryption_notice() {
        assert_eq!(
            classify("Nachrichten und Anrufe sind Ende-zu-Ende-verschlüsselt. Niemand außerhalb dieses Chats kann sie lesen oder anhören, nicht einmal WhatsApp. Tippe, um mehr zu erfahren."),
            Some(SystemEvent::EndToEndEncryption)
        );
        assert_eq!(
            classify("Nachrichten, die du in diesem Chat sendest, sowie Anrufe sind jetzt mit Ende-zu-Ende-Verschlüsselung geschützt."),
            Some(SystemEvent::EndToEndEncryption)
        );
    }

    #[test]
    fn test_room_create_by_third_party() {
        let found = German
            .catalog()
            .classify("Max Mustermann hat die Gruppe „Eiergilde“ erstellt")
            .unwrap();
        assert_eq!(found.event, SystemEvent::RoomCreateByThirdParty);
        assert_eq!(found.captures.sender, Some("Max Mustermann"));
        assert_eq!(found.captures.new_room_name, Some("Eiergilde"));
    }

    #[test]
    fn test_self_variants_win_over_generic() {
        assert_eq!(
            classify("Anna hat dich hinzugefügt"),
            Some(SystemEvent::RoomJoinSelfByThirdParty)
        );
        assert_eq!(
            classify("Anna hat dich entfernt"),
            Some(SystemEvent::RoomKickSelfByThirdParty)
        );
        assert_eq!(
            classify("Anna hat Ben hinzugefügt"),
            Some(SystemEvent::RoomJoinThirdPartyByThirdParty)
        );
    }

    #[test]
    fn test_join_and_kick_targets() {
        let catalog = German.catalog();

        let found = catalog.classify("Du hast Ben hinzugefügt").unwrap();
        assert_eq!(found.event, SystemEvent::RoomJoinThirdPartyBySelf);
        assert_eq!(found.captures.target, Some("Ben"));

        let found = catalog.classify("\u{200e}Ben wurde hinzugefügt").unwrap();
        assert_eq!(found.event, SystemEvent::RoomJoinThirdPartyByUnknown);
        assert_eq!(found.captures.target, Some("\u{200e}Ben"));

        let found = catalog
            .classify("Ben ist über den Einladungslink dieser Gruppe beigetreten")
            .unwrap();
        assert_eq!(found.event, SystemEvent::RoomJoinThirdPartyByUnknown);

        let found = catalog.classify("Anna hat Ben Meier entfernt").unwrap();
        assert_eq!(found.event, SystemEvent::RoomKickThirdPartyByThirdParty);
        assert_eq!(found.captures.sender, Some("Anna"));
        assert_eq!(found.captures.target, Some("Ben Meier"));

        assert_eq!(
            classify("Du hast Ben entfernt"),
            Some(SystemEvent::RoomKickThirdPartyBySelf)
        );
        assert_eq!(
            classify("Ben wurde entfernt"),
            Some(SystemEvent::RoomKickThirdPartyByUnknown)
        );
    }

    #[test]
    fn test_leave() {
        assert_eq!(classify("Du hast die Gruppe verlassen"), Some(SystemEvent::RoomLeaveSelf));
        assert_eq!(
            classify("Anna hat die Gruppe verlassen"),
            Some(SystemEvent::RoomLeaveThirdParty)
        );
    }

    #[test]
    fn test_rename_with_and_without_old_name() {
        let catalog = German.catalog();

        let found = catalog
            .classify("Du hast den Betreff von „Alt“ zu „Neu“ geändert")
            .unwrap();
        assert_eq!(found.event, SystemEvent::RoomNameBySelf);
        assert_eq!(found.captures.new_room_name, Some("Neu"));

        let found = catalog
            .classify("Anna hat den Gruppennamen in „Neu“ geändert")
            .unwrap();
        assert_eq!(found.event, SystemEvent::RoomNameByThirdParty);
        assert_eq!(found.captures.sender, Some("Anna"));
        assert_eq!(found.captures.new_room_name, Some("Neu"));
    }

    #[test]
    fn test_description_and_avatar() {
        assert_eq!(
            classify("Du hast die Gruppenbeschreibung geändert"),
            Some(SystemEvent::RoomDescriptionBySelf)
        );
        assert_eq!(
            classify("Anna hat die Gruppenbeschreibung geändert"),
            Some(SystemEvent::RoomDescriptionByThirdParty)
        );
        assert_eq!(
            classify("Du hast das Gruppenbild geändert"),
            Some(SystemEvent::RoomAvatarChangeBySelf)
        );
        assert_eq!(
            classify("Anna hat das Gruppenbild geändert"),
            Some(SystemEvent::RoomAvatarChangeByThirdParty)
        );
        assert_eq!(
            classify("Du hast das Gruppenbild gelöscht"),
            Some(SystemEvent::RoomAvatarDeleteBySelf)
        );
        assert_eq!(
            classify("Anna hat das Gruppenbild gelöscht"),
            Some(SystemEvent::RoomAvatarDeleteByThirdParty)
        );
    }

    #[test]
    fn test_number_change() {
        let found = German
            .catalog()
            .classify("Anna hat zu +49 151 2345678 gewechselt.")
            .unwrap();
        assert_eq!(found.event, SystemEvent::RoomNumberChangeWithNumber);
        assert_eq!(found.captures.new_number, Some("+49 151 2345678"));

        assert_eq!(
            classify("Anna hat die Telefonnummer zu einer neuen Nummer geändert. Tippe, um eine Nachricht zu schreiben oder die neue Nummer hinzuzufügen."),
            Some(SystemEvent::RoomNumberChangeWithoutNumber)
        );
    }

    #[test]
    fn test_admin_promotion() {
        assert_eq!(classify("Du bist jetzt ein Admin"), Some(SystemEvent::RoomAdminPromotion));
        assert_eq!(classify("Du bist jetzt Admin"), Some(SystemEvent::RoomAdminPromotion));
    }

    #[test]
    fn test_user_lines_are_not_events() {
        assert_eq!(classify("Anna: Du hast die Gruppe verlassen"), None);
        assert_eq!(classify("Anna: Ben wurde entfernt"), None);
        assert_eq!(classify("Sicherheitsnummer von Anna hat sich geändert"), None);
    }

    #[test]
    fn test_locale_metadata() {
        assert_eq!(German.id(), "de_de");
        assert_eq!(German.chat_file_extension(), "txt");
        assert!(German.file_excluded_markers().contains(&"<Media omitted>"));
    }
}
