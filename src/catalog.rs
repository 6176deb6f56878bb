use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{Bootstrap, ElementType, Event, Player, Team};

/// Fields kept from a raw catalog element.
pub const PLAYER_FIELDS: &[&str] = &[
    "id",
    "web_name",
    "first_name",
    "second_name",
    "team",
    "now_cost",
    "element_type",
    "status",
    "chance_of_playing_next_round",
    "ep_next",
    "ep_this",
    "minutes",
    "form",
    "ict_index",
    "selected_by_percent",
    "expected_goals_per_90",
    "expected_assists_per_90",
];

/// Deserializes a raw catalog element from its allow-listed fields only.
pub fn map_player(raw: &Value) -> Result<Player> {
    let id = raw.get("id").and_then(Value::as_u64);
    let projected: Map<String, Value> = PLAYER_FIELDS
        .iter()
        .filter_map(|&field| raw.get(field).map(|value| (field.to_string(), value.clone())))
        .collect();
    Player::deserialize(Value::Object(projected)).with_context(|| match id {
        Some(id) => format!("invalid catalog element {id}"),
        None => "invalid catalog element without id".to_string(),
    })
}

/// id -> position in `items`. Duplicate keys resolve to the last occurrence.
pub fn build_index<T>(items: &[T], key: impl Fn(&T) -> u32) -> HashMap<u32, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (pos, item) in items.iter().enumerate() {
        index.insert(key(item), pos);
    }
    index
}

/// The run's immutable player/team snapshot with O(1) id lookups.
#[derive(Debug, Clone)]
pub struct Catalog {
    players: Vec<Player>,
    teams: Vec<Team>,
    positions: Vec<ElementType>,
    events: Vec<Event>,
    players_by_id: HashMap<u32, usize>,
    teams_by_id: HashMap<u32, usize>,
}

impl Catalog {
    pub fn new(
        players: Vec<Player>,
        teams: Vec<Team>,
        positions: Vec<ElementType>,
        events: Vec<Event>,
    ) -> Self {
        let players_by_id = build_index(&players, |p| p.id);
        let teams_by_id = build_index(&teams, |t| t.id);
        Self {
            players,
            teams,
            positions,
            events,
            players_by_id,
            teams_by_id,
        }
    }

    pub fn from_bootstrap(boot: Bootstrap) -> Result<Self> {
        let players = boot
            .elements
            .iter()
            .map(map_player)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(players, boot.teams, boot.element_types, boot.events))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn positions(&self) -> &[ElementType] {
        &self.positions
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players_by_id.get(&id).map(|&pos| &self.players[pos])
    }

    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams_by_id.get(&id).map(|&pos| &self.teams[pos])
    }

    pub fn team_short_name(&self, id: u32) -> String {
        self.team(id)
            .map(|t| t.short_name.clone())
            .unwrap_or_else(|| format!("Team{id}"))
    }

    pub fn event(&self, id: u32) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn max_event_id(&self) -> Option<u32> {
        self.events.iter().map(|e| e.id).max()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn team(id: u32, short: &str) -> Team {
        Team {
            id,
            name: short.to_string(),
            short_name: short.to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn index_is_last_write_wins() {
        let teams = vec![team(1, "ARS"), team(2, "AVL"), team(1, "BOU")];
        let index = build_index(&teams, |t| t.id);
        assert_eq!(index.len(), 2);
        assert_eq!(teams[index[&1]].short_name, "BOU");
    }

    #[test]
    fn unknown_team_falls_back_to_numbered_name() {
        let catalog = Catalog::new(Vec::new(), vec![team(1, "ARS")], Vec::new(), Vec::new());
        assert_eq!(catalog.team_short_name(1), "ARS");
        assert_eq!(catalog.team_short_name(42), "Team42");
        assert_eq!(catalog.max_event_id(), None);
    }

    #[test]
    fn allow_list_matches_player_fields() {
        let raw = json!({
            "id": 7, "web_name": "Saka", "first_name": "Bukayo", "second_name": "Saka",
            "team": 1, "now_cost": 101, "element_type": 3, "status": "a",
            "ep_next": "6.2", "photo": "7.jpg", "news": ""
        });
        let player = map_player(&raw).unwrap();
        let written = serde_json::to_value(&player).unwrap();
        let keys: Vec<&str> = written.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, PLAYER_FIELDS);
    }

    #[test]
    fn map_player_reports_the_offending_id() {
        let err = map_player(&json!({ "id": 77, "web_name": "X" })).unwrap_err();
        assert!(err.to_string().contains("77"));
    }
}
