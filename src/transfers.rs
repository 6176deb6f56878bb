use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::model::{Player, Position};
use crate::squad::{SquadAnalysis, SquadEntry};

#[derive(Debug, Clone, Copy)]
pub struct TransferConfig {
    pub max_suggestions: usize,
    pub candidates_per_position: usize,
    pub min_improvement: f64,
    pub max_per_club: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            candidates_per_position: 3,
            min_improvement: 0.5,
            max_per_club: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSuggestion {
    pub out_player: String,
    pub out_id: u32,
    pub in_player: String,
    pub in_id: u32,
    pub position_type: String,
    pub cost_change: f64,
    pub ep_improvement: f64,
    pub out_team: String,
    pub in_team: String,
    pub feasible: bool,
}

/// Greedy one-for-one swaps: per position, the lowest projected squad member
/// against the best few affordable, available replacements.
pub fn suggest_transfers(
    squad: &SquadAnalysis,
    catalog: &Catalog,
    bank_tenths: i64,
    cfg: &TransferConfig,
) -> Vec<TransferSuggestion> {
    let owned: HashSet<u32> = squad.squad.iter().map(|e| e.element_id).collect();
    let mut suggestions = Vec::new();

    for position in Position::ALL {
        let Some(weakest) = weakest_in_position(&squad.squad, position) else {
            continue;
        };
        let budget = weakest.selling_price_tenths() + bank_tenths;

        let mut candidates: Vec<&Player> = catalog
            .players()
            .iter()
            .filter(|p| p.element_type == position.code())
            .filter(|p| !owned.contains(&p.id))
            .filter(|p| p.is_available())
            .filter(|p| p.now_cost <= budget)
            .collect();
        candidates.sort_by(|a, b| b.ep_next_or_zero().total_cmp(&a.ep_next_or_zero()));

        for candidate in candidates.into_iter().take(cfg.candidates_per_position) {
            let in_team = catalog.team_short_name(candidate.team);
            if in_team != weakest.team
                && exceeds_club_limit(&squad.club_counts, &in_team, cfg.max_per_club)
            {
                continue;
            }

            let cost_change_tenths = candidate.now_cost - weakest.selling_price_tenths();
            let ep_improvement = candidate.ep_next_or_zero() - weakest.ep_next;
            if ep_improvement <= cfg.min_improvement {
                continue;
            }

            suggestions.push(TransferSuggestion {
                out_player: weakest.name.clone(),
                out_id: weakest.element_id,
                in_player: candidate.web_name.clone(),
                in_id: candidate.id,
                position_type: weakest.position_type.clone(),
                cost_change: cost_change_tenths as f64 / 10.0,
                ep_improvement,
                out_team: weakest.team.clone(),
                in_team,
                feasible: cost_change_tenths <= bank_tenths,
            });
        }
    }

    suggestions.sort_by(|a, b| {
        b.feasible
            .cmp(&a.feasible)
            .then(b.ep_improvement.total_cmp(&a.ep_improvement))
    });
    suggestions.truncate(cfg.max_suggestions);
    suggestions
}

// First minimum wins on ties, so squad order decides.
fn weakest_in_position(squad: &[SquadEntry], position: Position) -> Option<&SquadEntry> {
    squad
        .iter()
        .filter(|e| e.element_type == position.code())
        .min_by(|a, b| a.ep_next.total_cmp(&b.ep_next))
}

fn exceeds_club_limit(club_counts: &BTreeMap<String, u32>, club: &str, max_per_club: u32) -> bool {
    club_counts.get(club).copied().unwrap_or(0) + 1 > max_per_club
}
