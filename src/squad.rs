use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Catalog;
use crate::model::{Fetched, MyTeam, Pick, position_label};

/// One pick joined with its catalog player and team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadEntry {
    pub element_id: u32,
    pub position: u8,
    pub name: String,
    pub full_name: String,
    pub team: String,
    pub team_id: u32,
    pub position_type: String,
    pub element_type: u8,
    pub cost: f64,
    pub selling_price: f64,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    pub multiplier: u8,
    pub ep_next: f64,
    pub form: f64,
    pub status: String,
    pub chance_of_playing: Option<u8>,
    pub minutes: u32,
    pub ict_index: f64,
}

impl SquadEntry {
    pub fn selling_price_tenths(&self) -> i64 {
        to_tenths(self.selling_price)
    }

    pub fn is_starting(&self) -> bool {
        self.multiplier > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadAnalysis {
    pub squad: Vec<SquadEntry>,
    pub captain_id: Option<u32>,
    pub vice_id: Option<u32>,
    pub club_counts: BTreeMap<String, u32>,
    pub total_squad_value: f64,
    pub starting_xi: Vec<SquadEntry>,
    pub bench: Vec<SquadEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Needs the authenticated team detail; `None` when it could not be fetched.
pub fn analyze_squad(my_team: &Fetched<MyTeam>, catalog: &Catalog) -> Option<SquadAnalysis> {
    match my_team {
        Fetched::Ok(team) => Some(analyze_picks(&team.picks, catalog)),
        Fetched::Failed(err) => {
            warn!(error = %err, "my_team unavailable (authentication required), skipping squad analysis");
            None
        }
    }
}

pub fn analyze_picks(picks: &[Pick], catalog: &Catalog) -> SquadAnalysis {
    let mut squad = Vec::with_capacity(picks.len());
    let mut warnings = Vec::new();
    let mut captain_id = None;
    let mut vice_id = None;
    let mut club_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut total_cost: i64 = 0;

    for pick in picks {
        let Some(player) = catalog.player(pick.element) else {
            warn!(element = pick.element, "pick references a player missing from the catalog");
            warnings.push(format!("Player {} not found in catalog", pick.element));
            continue;
        };

        let team_name = catalog.team_short_name(player.team);
        let element_type = pick.element_type.unwrap_or(player.element_type);

        // Inconsistent payloads may flag several; the last one seen wins.
        if pick.is_captain {
            captain_id = Some(pick.element);
        }
        if pick.is_vice_captain {
            vice_id = Some(pick.element);
        }

        *club_counts.entry(team_name.clone()).or_insert(0) += 1;
        total_cost += player.now_cost;

        squad.push(SquadEntry {
            element_id: pick.element,
            position: pick.position,
            name: player.web_name.clone(),
            full_name: player.full_name(),
            team: team_name,
            team_id: player.team,
            position_type: position_label(element_type).to_string(),
            element_type,
            cost: player.now_cost as f64 / 10.0,
            selling_price: pick.selling_price.unwrap_or(player.now_cost) as f64 / 10.0,
            is_captain: pick.is_captain,
            is_vice_captain: pick.is_vice_captain,
            multiplier: pick.multiplier,
            ep_next: player.ep_next_or_zero(),
            form: player.form.unwrap_or(0.0),
            status: player.status.clone(),
            chance_of_playing: player.chance_of_playing_next_round,
            minutes: player.minutes.unwrap_or(0),
            ict_index: player.ict_index.unwrap_or(0.0),
        });
    }

    squad.sort_by_key(|entry| entry.position);

    let (starting_xi, bench): (Vec<SquadEntry>, Vec<SquadEntry>) =
        squad.iter().cloned().partition(SquadEntry::is_starting);

    SquadAnalysis {
        squad,
        captain_id,
        vice_id,
        club_counts,
        total_squad_value: total_cost as f64 / 10.0,
        starting_xi,
        bench,
        warnings,
    }
}

pub fn to_tenths(amount: f64) -> i64 {
    (amount * 10.0).round() as i64
}
