use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::model::Fixture;

pub const DEFAULT_FIXTURE_WINDOW: u32 = 6;

// Used when a fixture carries no rating for one side.
const NEUTRAL_DIFFICULTY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDifficulty {
    pub avg_difficulty: f64,
    pub fixture_count: u32,
}

/// Fixtures in gameweeks `gameweek .. gameweek + window`, clipped to the last
/// gameweek of the season.
pub fn upcoming_window(
    fixtures: &[Fixture],
    gameweek: u32,
    window: u32,
    max_event_id: Option<u32>,
) -> Vec<Fixture> {
    let mut end = gameweek.saturating_add(window);
    if let Some(last) = max_event_id {
        end = end.min(last.saturating_add(1));
    }
    fixtures
        .iter()
        .filter(|fx| fx.event.is_some_and(|ev| ev >= gameweek && ev < end))
        .cloned()
        .collect()
}

/// Average difficulty per team (keyed by short name) over the given fixtures.
/// Teams with no fixtures are left out.
pub fn fixture_difficulty(
    fixtures: &[Fixture],
    catalog: &Catalog,
) -> BTreeMap<String, TeamDifficulty> {
    let mut totals: HashMap<u32, (u32, u32)> = HashMap::new();

    for fx in fixtures {
        if fx.event.is_none() {
            continue;
        }
        let home = totals.entry(fx.team_h).or_insert((0, 0));
        home.0 += u32::from(fx.team_h_difficulty.unwrap_or(NEUTRAL_DIFFICULTY));
        home.1 += 1;

        let away = totals.entry(fx.team_a).or_insert((0, 0));
        away.0 += u32::from(fx.team_a_difficulty.unwrap_or(NEUTRAL_DIFFICULTY));
        away.1 += 1;
    }

    totals
        .into_iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(team_id, (sum, count))| {
            let avg = f64::from(sum) / f64::from(count);
            (
                catalog.team_short_name(team_id),
                TeamDifficulty {
                    avg_difficulty: round2(avg),
                    fixture_count: count,
                },
            )
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
