use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use fpl_context::catalog::{Catalog, PLAYER_FIELDS, map_player};
use fpl_context::model::{Bootstrap, Fetched, Fixture, MyTeam};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn mapped_players_keep_id_and_only_allow_listed_fields() {
    let raw: Value = serde_json::from_str(&read_fixture("bootstrap_static.json")).unwrap();
    let elements = raw["elements"].as_array().expect("elements array");
    assert!(!elements.is_empty());

    for element in elements {
        let player = map_player(element).expect("element should map");
        assert_eq!(Some(u64::from(player.id)), element["id"].as_u64());

        let written = serde_json::to_value(&player).unwrap();
        for key in written.as_object().unwrap().keys() {
            assert!(PLAYER_FIELDS.contains(&key.as_str()), "unexpected field {key}");
        }
        assert!(written.get("photo").is_none());
        assert!(written.get("news").is_none());
    }
}

#[test]
fn bootstrap_builds_catalog_with_lookups() {
    let boot: Bootstrap = serde_json::from_str(&read_fixture("bootstrap_static.json")).unwrap();
    let catalog = Catalog::from_bootstrap(boot).expect("catalog should build");

    assert_eq!(catalog.players().len(), 20);
    assert_eq!(catalog.teams().len(), 5);
    assert_eq!(catalog.max_event_id(), Some(8));

    let palmer = catalog.player(10).expect("palmer present");
    assert_eq!(palmer.web_name, "Palmer");
    assert_eq!(palmer.ep_next, Some(6.5));
    assert_eq!(palmer.expected_goals_per_90, Some(0.21));
    assert!(catalog.player(999).is_none());

    let chelsea = catalog.team(3).expect("chelsea present");
    assert_eq!(chelsea.short_name, "CHE");
    // Fields outside the typed view are carried along for the output file.
    assert_eq!(chelsea.extra.get("strength"), Some(&Value::from(4)));

    let gw5 = catalog.event(5).expect("event 5 present");
    assert!(gw5.is_next);
    assert!(!gw5.is_current);
}

#[test]
fn fixtures_parse_with_missing_difficulty_and_null_event() {
    let fixtures: Vec<Fixture> =
        serde_json::from_str(&read_fixture("fixtures_upcoming.json")).unwrap();
    assert_eq!(fixtures.len(), 6);

    let unscheduled = fixtures.iter().find(|f| f.id == 105).unwrap();
    assert_eq!(unscheduled.event, None);

    let unrated = fixtures.iter().find(|f| f.id == 106).unwrap();
    assert_eq!(unrated.team_h_difficulty, None);
    assert_eq!(unrated.team_a_difficulty, None);
}

#[test]
fn my_team_sentinel_and_payload_both_load() {
    let ok: Fetched<MyTeam> = serde_json::from_str(&read_fixture("my_team.json")).unwrap();
    let team = ok.ok().expect("payload should parse");
    assert_eq!(team.picks.len(), 7);
    assert_eq!(team.chips.len(), 3);
    let transfers = team.transfers.as_ref().unwrap();
    assert_eq!(transfers.free_transfers(), Some(1));
    assert_eq!(transfers.extra.get("cost"), Some(&Value::from(4)));

    let failed: Fetched<MyTeam> =
        serde_json::from_str(r#"{"_error": "http 403 Forbidden from https://x/my-team/1/"}"#)
            .unwrap();
    assert_eq!(
        failed.error(),
        Some("http 403 Forbidden from https://x/my-team/1/")
    );
}
