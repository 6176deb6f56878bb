use std::fs;
use std::path::PathBuf;

use serde_json::Map;

use fpl_context::catalog::Catalog;
use fpl_context::model::{Bootstrap, Fetched, MyTeam, Pick};
use fpl_context::squad::{analyze_picks, analyze_squad};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn catalog() -> Catalog {
    let boot: Bootstrap = serde_json::from_str(&read_fixture("bootstrap_static.json")).unwrap();
    Catalog::from_bootstrap(boot).unwrap()
}

fn my_team() -> MyTeam {
    serde_json::from_str(&read_fixture("my_team.json")).unwrap()
}

fn pick(element: u32, position: u8, multiplier: u8) -> Pick {
    Pick {
        element,
        position,
        multiplier,
        is_captain: false,
        is_vice_captain: false,
        element_type: None,
        selling_price: None,
        extra: Map::new(),
    }
}

#[test]
fn joins_picks_and_skips_unknown_players() {
    let catalog = catalog();
    let analysis = analyze_squad(&Fetched::Ok(my_team()), &catalog).expect("analysis");

    // Seven picks, one of which (999) is not in the catalog.
    assert_eq!(analysis.squad.len(), 6);
    assert!(analysis.squad.iter().all(|e| e.element_id != 999));
    assert_eq!(analysis.warnings, vec!["Player 999 not found in catalog".to_string()]);

    let positions: Vec<u8> = analysis.squad.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5, 12]);

    let palmer = analysis.squad.iter().find(|e| e.element_id == 10).unwrap();
    assert_eq!(palmer.full_name, "Cole Palmer");
    assert_eq!(palmer.team, "CHE");
    assert_eq!(palmer.position_type, "MID");
    assert_eq!(palmer.cost, 10.5);
    assert_eq!(palmer.form, 7.2);

    let watkins = analysis.squad.iter().find(|e| e.element_id == 20).unwrap();
    assert_eq!(watkins.cost, 9.0);
    assert_eq!(watkins.selling_price, 8.8);

    assert_eq!(analysis.captain_id, Some(10));
    assert_eq!(analysis.vice_id, Some(20));
}

#[test]
fn squad_value_uses_catalog_cost_not_selling_price() {
    let catalog = catalog();
    let analysis = analyze_squad(&Fetched::Ok(my_team()), &catalog).unwrap();

    let expected: i64 = analysis
        .squad
        .iter()
        .map(|e| catalog.player(e.element_id).unwrap().now_cost)
        .sum();
    assert!((analysis.total_squad_value - expected as f64 * 0.1).abs() < 1e-9);
    assert!((analysis.total_squad_value - 42.2).abs() < 1e-9);
}

#[test]
fn starting_and_bench_partition_the_squad() {
    let catalog = catalog();
    let picks = vec![
        pick(1, 1, 1),
        pick(2, 12, 0),
        pick(3, 2, 2),
        pick(5, 3, 3),
        pick(10, 4, 0),
        pick(20, 5, 1),
    ];
    let analysis = analyze_picks(&picks, &catalog);

    assert_eq!(
        analysis.starting_xi.len() + analysis.bench.len(),
        analysis.squad.len()
    );
    for entry in &analysis.squad {
        let starting = analysis.starting_xi.iter().any(|e| e.element_id == entry.element_id);
        let benched = analysis.bench.iter().any(|e| e.element_id == entry.element_id);
        assert!(starting != benched, "{} must be in exactly one group", entry.name);
        assert_eq!(starting, entry.multiplier > 0);
    }
    // Lineup position does not decide the split, the multiplier does.
    assert!(analysis.bench.iter().any(|e| e.element_id == 10 && e.position == 4));
}

#[test]
fn club_counts_sum_to_resolved_picks() {
    let catalog = catalog();
    let analysis = analyze_squad(&Fetched::Ok(my_team()), &catalog).unwrap();

    let total: u32 = analysis.club_counts.values().sum();
    assert_eq!(total as usize, analysis.squad.len());
    assert_eq!(analysis.club_counts.get("ARS"), Some(&3));
    assert_eq!(analysis.club_counts.get("AVL"), Some(&2));
    assert_eq!(analysis.club_counts.get("CHE"), Some(&1));
}

#[test]
fn last_flagged_captain_wins() {
    let catalog = catalog();
    let mut first = pick(1, 1, 2);
    first.is_captain = true;
    let mut second = pick(3, 2, 2);
    second.is_captain = true;
    second.is_vice_captain = true;
    let mut third = pick(5, 3, 1);
    third.is_vice_captain = true;

    let analysis = analyze_picks(&[first, second, third], &catalog);
    assert_eq!(analysis.captain_id, Some(3));
    assert_eq!(analysis.vice_id, Some(5));
}

#[test]
fn missing_selling_price_falls_back_to_catalog_cost() {
    let catalog = catalog();
    let analysis = analyze_picks(&[pick(51, 1, 1)], &catalog);
    assert_eq!(analysis.squad[0].selling_price, 10.0);
    // Position label comes from the catalog when the pick carries none.
    assert_eq!(analysis.squad[0].position_type, "MID");
}

#[test]
fn unauthenticated_team_yields_no_analysis() {
    let catalog = catalog();
    let failed: Fetched<MyTeam> = Fetched::Failed("http 403 Forbidden".to_string());
    assert!(analyze_squad(&failed, &catalog).is_none());
}
