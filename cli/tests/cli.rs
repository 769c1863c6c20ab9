use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn coterie(store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("coterie").unwrap();
    cmd.arg("--store").arg(store);
    cmd
}

#[test]
fn new_then_list() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");

    coterie(&store)
        .args(["new", "--kind", "vampire", "--name", "Mina"])
        .assert()
        .success();
    coterie(&store)
        .args(["new", "--kind", "mage", "--name", "Porthos"])
        .assert()
        .success();

    coterie(&store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vampire\tMina"))
        .stdout(predicate::str::contains("Mage\tPorthos"));
}

#[test]
fn set_attribute_logs_derived_change() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");
    coterie(&store)
        .args(["new", "--kind", "ghoul", "--name", "Renfield"])
        .assert()
        .success();

    coterie(&store)
        .args(["set", "Renfield", "--trait-name", "Stamina", "--value", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stamina 1→3"))
        .stdout(predicate::str::contains("health 4→6"));

    coterie(&store)
        .args(["log", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("health 4→6"));
}

#[test]
fn out_of_range_rating_fails() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");
    coterie(&store)
        .args(["new", "--kind", "vampire", "--name", "Mina"])
        .assert()
        .success();
    coterie(&store)
        .args(["set", "Mina", "--trait-name", "Strength", "--value", "9"])
        .assert()
        .failure();
}

#[test]
fn learn_and_toggle_a_power() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");
    coterie(&store)
        .args(["new", "--kind", "vampire", "--name", "Beckett"])
        .assert()
        .success();
    coterie(&store)
        .args(["learn", "Beckett", "--discipline", "Fortitude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("learned Fortitude"));
    coterie(&store)
        .args([
            "toggle",
            "Beckett",
            "--discipline",
            "Fortitude",
            "--power",
            "Resilience",
            "--level",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("health 4→5"))
        .stdout(predicate::str::contains("Fortitude powers added: Resilience"));
}

#[test]
fn archive_round_trip() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");
    coterie(&store)
        .args(["new", "--kind", "mage", "--name", "Porthos"])
        .assert()
        .success();
    coterie(&store).args(["archive", "Porthos"]).assert().success();
    coterie(&store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Porthos").not());
    coterie(&store)
        .args(["list", "--archived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Porthos"));
    coterie(&store).args(["unarchive", "Porthos"]).assert().success();
    coterie(&store)
        .args(["log", "Porthos"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Character moved to archive."))
        .stdout(predicate::str::contains("Character returned from archive"));
}

#[test]
fn diff_two_files() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");
    coterie(&store)
        .args(["new", "--kind", "vampire", "--name", "Mina"])
        .assert()
        .success();
    let shown = coterie(&store).args(["show", "Mina"]).output().unwrap();
    let before = String::from_utf8(shown.stdout).unwrap();
    let after = before.replace("\"Mina\"", "\"Mina Murray\"");

    let before_path = dir.path().join("before.json");
    let after_path = dir.path().join("after.json");
    std::fs::write(&before_path, &before).unwrap();
    // BOM-prefixed input is accepted
    let mut bom = vec![0xEF, 0xBB, 0xBF];
    bom.extend_from_slice(after.as_bytes());
    std::fs::write(&after_path, bom).unwrap();

    coterie(&store)
        .arg("diff")
        .arg(&before_path)
        .arg(&after_path)
        .assert()
        .success()
        .stdout("name Mina→Mina Murray\n");
}

#[test]
fn export_then_import_into_another_roster() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("roster.json");
    let other = dir.path().join("other.json");
    let payload = dir.path().join("mina.coterie");
    coterie(&store)
        .args(["new", "--kind", "vampire", "--name", "Mina"])
        .assert()
        .success();
    coterie(&store)
        .args(["export", "Mina", "--out"])
        .arg(&payload)
        .assert()
        .success();

    coterie(&other).arg("import").arg(&payload).assert().success();
    coterie(&other)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vampire\tMina"));
}

#[test]
fn catalog_lists_disciplines() {
    let dir = tempdir().unwrap();
    coterie(&dir.path().join("roster.json"))
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fortitude (9 powers)"))
        .stdout(predicate::str::contains("Animalism"));
}

#[test]
fn unknown_target_fails() {
    let dir = tempdir().unwrap();
    coterie(&dir.path().join("roster.json"))
        .args(["show", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no character named 'Nobody'"));
}
