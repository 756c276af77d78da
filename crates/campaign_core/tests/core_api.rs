mod fixture;

use campaign_core::campaign::{CHECKSUM_OFFSET, SEGMENT_COUNT};
use campaign_core::codec::EncoderConfig;
use campaign_core::core_api::{CoreErrorCode, DvarEntry, Engine};
use campaign_core::hash::hash_dvar;
use campaign_core::layout::SectionId;
use campaign_core::segment2::{DvarMap, StringTable};
use fixture::{STORED_HEALTH, default_save, save_file, segment2_record};

#[test]
fn engine_opens_fixture() {
    let session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");

    let snapshot = session.snapshot();
    assert!(snapshot.checksum.is_valid());
    assert_eq!(snapshot.segment_count, SEGMENT_COUNT);
    assert_eq!(snapshot.dvar_count, 3);
    assert_eq!(snapshot.stored_health, STORED_HEALTH);
    assert_eq!(snapshot.effective_health, Some(STORED_HEALTH));
    assert_eq!(snapshot.trailing_len, 0);
    assert_eq!(snapshot.string_tables.len(), StringTable::ALL.len());

    let text = snapshot
        .string_tables
        .iter()
        .find(|s| s.table == StringTable::Text1)
        .expect("text1 summary");
    assert_eq!(text.capacity, 0x95F);
    assert_eq!(text.populated, 0x95F_usize.div_ceil(5));
}

#[test]
fn dvars_list_in_file_order() {
    let session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");
    assert_eq!(
        session.dvars(),
        vec![
            DvarEntry {
                hash: "0x1A2B3C4D".to_string(),
                value: Some("1".to_string()),
            },
            DvarEntry {
                hash: "0x00C0FFEE".to_string(),
                value: Some("0.75".to_string()),
            },
            DvarEntry {
                hash: "0x7E57AB1E".to_string(),
                value: Some("hello world".to_string()),
            },
        ]
    );
    assert_eq!(session.dvar("0x00C0FFEE"), Some("0.75"));
    assert_eq!(session.dvar("g_speed"), None);
}

#[test]
fn unedited_session_writes_identical_bytes() {
    let bytes = default_save();
    let mut session = Engine::new().open_bytes(&bytes).expect("fixture should open");
    assert_eq!(session.to_bytes().expect("save should emit"), bytes);
}

#[test]
fn set_dvar_by_name_round_trips() {
    let mut session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");

    let hash = session
        .set_dvar("player_sprintUnlimited", "1")
        .expect("ascii value");
    assert_eq!(hash, hash_dvar("PLAYER_SPRINTUNLIMITED"));
    session
        .set_dvar("g_player_maxHealth", "1000")
        .expect("ascii value");

    let bytes = session.to_bytes().expect("save should emit");
    let reopened = Engine::new().open_bytes(&bytes).expect("edited save should open");
    assert_eq!(reopened.dvar("player_sprintunlimited"), Some("1"));
    assert_eq!(reopened.snapshot().stored_health, 1000);
    assert_eq!(reopened.snapshot().dvar_count, 5);
}

#[test]
fn unset_and_remove_drop_dvars_from_output() {
    let mut session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");

    session.unset_dvar("0x1A2B3C4D");
    assert_eq!(session.dvar("0x1A2B3C4D"), None);
    assert_eq!(
        session.remove_dvar("0x00C0FFEE").expect("present"),
        Some("0.75".to_string())
    );
    let err = session.remove_dvar("g_gravity").expect_err("absent");
    assert_eq!(err.code, CoreErrorCode::InvalidInput);

    let bytes = session.to_bytes().expect("save should emit");
    let reopened = Engine::new().open_bytes(&bytes).expect("edited save should open");
    assert_eq!(reopened.snapshot().dvar_count, 1);
    assert_eq!(reopened.dvar("0x7E57AB1E"), Some("hello world"));
}

#[test]
fn import_replaces_and_export_returns_map() {
    let mut session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");

    let exported = session.export_dvars();
    assert_eq!(exported.len(), 3);

    let backup: DvarMap =
        serde_json::from_str(r#"{"0x00000042":"42","__comment":"skip me","0x00000043":null}"#)
            .expect("valid backup");
    session.import_dvars(backup);

    let bytes = session.to_bytes().expect("save should emit");
    let reopened = Engine::new().open_bytes(&bytes).expect("edited save should open");
    let dvars = reopened.dvars();
    assert_eq!(dvars.len(), 1);
    assert_eq!(dvars[0].hash, "0x00000042");

    let json = serde_json::to_string(&exported).expect("serialize");
    let restored: DvarMap = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, exported);
}

#[test]
fn non_numeric_health_dvar_blocks_save() {
    let mut session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");
    session
        .set_dvar("g_player_maxHealth", "plenty")
        .expect("ascii value");
    assert_eq!(session.snapshot().effective_health, None);

    let err = session.to_bytes().expect_err("health must be numeric");
    assert_eq!(err.code, CoreErrorCode::InvalidInput);
}

#[test]
fn wide_characters_are_rejected() {
    let mut session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");
    let err = session
        .set_dvar("g_speed", "fast\u{1F680}")
        .expect_err("non single-byte");
    assert_eq!(err.code, CoreErrorCode::InvalidInput);
}

#[test]
fn encoder_limit_is_reported_as_codec_error() {
    let engine = Engine::with_encoder_config(EncoderConfig { max_output_len: 64 });
    let mut session = engine.open_bytes(default_save()).expect("fixture should open");
    let err = session.to_bytes().expect_err("limit should trip");
    assert_eq!(err.code, CoreErrorCode::Codec);
}

#[test]
fn layout_lists_header_and_segments() {
    let session = Engine::new()
        .open_bytes(default_save())
        .expect("fixture should open");
    let layout = session.layout();
    layout.validate().expect("layout should validate");
    assert_eq!(layout.sections[0].id, SectionId::Header);
    assert_eq!(layout.sections.len(), SEGMENT_COUNT + 1);
    assert_eq!(layout.file_len, default_save().len());
}

#[test]
fn garbage_input_is_a_parse_error() {
    let err = Engine::new()
        .open_bytes(vec![0u8; 100])
        .expect_err("too short");
    assert_eq!(err.code, CoreErrorCode::Parse);

    let mut bytes = save_file(&segment2_record(&[], 1));
    bytes[CHECKSUM_OFFSET] ^= 0x55;
    let session = Engine::new()
        .open_bytes(&bytes)
        .expect("checksum mismatch is not fatal");
    assert!(!session.snapshot().checksum.is_valid());
}
