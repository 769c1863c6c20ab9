use coterie_engine::api::{
    available_disciplines, available_disciplines_json, decode_text, diff_json, load_character,
    new_character_json, parse_character, recalculate_json, toggle_power, ToggleRequest,
};
use coterie_engine::content::standard_discipline;
use coterie_engine::Character;
use serde_json::json;

#[test]
fn new_character_json_builds_the_requested_kind() {
    let text = new_character_json("ghoul", "Renfield").unwrap();
    let c = parse_character(&text).unwrap();
    assert_eq!(c.name(), "Renfield");
    assert!(c.as_ghoul().is_ok());
    assert!(new_character_json("werewolf", "Nope").is_err());
}

#[test]
fn diff_json_reports_lines_and_summary() {
    let before = Character::new_vampire("Ada");
    let mut after = before.clone();
    after.sheet.chronicle = "Chicago by Night".into();
    after.sheet.touchstones.push("Sister Maria".into());
    let request = json!({ "before": before, "after": after }).to_string();

    let result = diff_json(&request).unwrap();

    assert_eq!(
        result.changes,
        vec!["chronicle →Chicago by Night", "touchstones added: Sister Maria"]
    );
    assert_eq!(
        result.summary.as_deref(),
        Some("chronicle →Chicago by Night\ntouchstones added: Sister Maria")
    );
}

#[test]
fn recalculate_json_fixes_stale_capacity() {
    let mut c = Character::new_vampire("Ada");
    c.sheet.physical_attributes.set("Stamina", 4).unwrap();
    let stale = serde_json::to_string(&c).unwrap();

    let fresh = parse_character(&recalculate_json(&stale).unwrap()).unwrap();
    assert_eq!(fresh.sheet.health, 7);
    assert_eq!(fresh.sheet.health_track.len(), 7);
}

#[test]
fn toggle_power_by_name() {
    let mut c = Character::new_vampire("Ada");
    c.learn_discipline(standard_discipline("Fortitude").unwrap())
        .unwrap();

    let result = toggle_power(ToggleRequest {
        character: c,
        discipline: "Fortitude".into(),
        power: "resilience".into(),
        level: 1,
    })
    .unwrap();

    assert!(result.selected);
    assert_eq!(result.current_level, 1);
    assert_eq!(result.character.sheet.health, 5);

    let missing = toggle_power(ToggleRequest {
        character: result.character,
        discipline: "Fortitude".into(),
        power: "Resilience".into(),
        level: 2,
    });
    assert!(missing.is_err());
}

#[test]
fn available_disciplines_by_name() {
    let mut c = Character::new_vampire("Ada");
    c.learn_discipline(standard_discipline("Oblivion").unwrap())
        .unwrap();
    let names = available_disciplines(&c).unwrap();
    assert!(names.contains(&"Potence".to_string()));
    assert!(!names.contains(&"Oblivion".to_string()));
    assert!(available_disciplines(&Character::new_mage("Cy")).is_err());
}

#[test]
fn available_disciplines_from_json() {
    let text = new_character_json("ghoul", "Renfield").unwrap();
    let names = available_disciplines_json(&text).unwrap();
    assert_eq!(names.len(), 11);
    assert!(available_disciplines_json("{}").is_err());
}

#[test]
fn load_character_accepts_byte_order_marks() {
    let dir = tempfile::tempdir().unwrap();
    let json = new_character_json("vampire", "Mina").unwrap();

    let utf8 = dir.path().join("utf8.json");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(json.as_bytes());
    std::fs::write(&utf8, bytes).unwrap();
    assert_eq!(load_character(&utf8).unwrap().name(), "Mina");

    let utf16 = dir.path().join("utf16.json");
    let mut bytes = vec![0xFF, 0xFE];
    for unit in json.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    std::fs::write(&utf16, bytes).unwrap();
    assert_eq!(load_character(&utf16).unwrap().name(), "Mina");

    assert!(load_character(&dir.path().join("missing.json")).is_err());
}

#[test]
fn decode_text_rejects_invalid_utf8_without_a_bom() {
    assert_eq!(decode_text(b"{}".to_vec()).unwrap(), "{}");
    assert!(decode_text(vec![0x78, 0xDA, 0xFF, 0xFE]).is_err());
}
