use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key of the sentinel object that stands in for a failed fetch in the
/// written context.
pub const ERROR_KEY: &str = "_error";

/// Outcome of a fetch that is allowed to fail without aborting the run.
///
/// Serializes as the payload itself, or as `{"_error": "<message>"}` when the
/// fetch failed. Deserializing such an object yields `Failed` again.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Ok(T),
    Failed(String),
}

impl<T> Fetched<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            Fetched::Ok(value) => Some(value),
            Fetched::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Fetched::Ok(_) => None,
            Fetched::Failed(message) => Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Fetched::Ok(_))
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Fetched<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(value) => Fetched::Ok(value),
            Err(err) => Fetched::Failed(err.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for Fetched<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fetched::Ok(value) => value.serialize(serializer),
            Fetched::Failed(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(ERROR_KEY, message)?;
                map.end()
            }
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Fetched<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Some(message) = value.get(ERROR_KEY) {
            let message = message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| message.to_string());
            return Ok(Fetched::Failed(message));
        }
        serde_json::from_value(value)
            .map(Fetched::Ok)
            .map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Position::Goalkeeper => 1,
            Position::Defender => 2,
            Position::Midfielder => 3,
            Position::Forward => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

pub fn position_label(code: u8) -> &'static str {
    Position::from_code(code).map(Position::label).unwrap_or("UNK")
}

/// Allow-listed projection of a catalog element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub web_name: String,
    pub first_name: String,
    pub second_name: String,
    pub team: u32,
    pub now_cost: i64,
    pub element_type: u8,
    pub status: String,
    #[serde(default)]
    pub chance_of_playing_next_round: Option<u8>,
    #[serde(default, deserialize_with = "metric")]
    pub ep_next: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub ep_this: Option<f64>,
    #[serde(default)]
    pub minutes: Option<u32>,
    #[serde(default, deserialize_with = "metric")]
    pub form: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub ict_index: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub selected_by_percent: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub expected_goals_per_90: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub expected_assists_per_90: Option<f64>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    pub fn ep_next_or_zero(&self) -> f64 {
        self.ep_next.unwrap_or(0.0)
    }

    pub fn is_available(&self) -> bool {
        self.status == "a"
    }
}

// The API sends most metrics as decimal strings ("4.5") and a few as numbers.
fn metric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub short_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementType {
    pub id: u8,
    #[serde(default)]
    pub singular_name_short: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One gameweek from the catalog's event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `bootstrap-static` payload. Elements stay raw until mapped.
#[derive(Debug, Clone, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub elements: Vec<Value>,
    #[serde(default)]
    pub element_types: Vec<ElementType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub team_h_difficulty: Option<u8>,
    #[serde(default)]
    pub team_a_difficulty: Option<u8>,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A squad slot from the authenticated team detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub element: u32,
    pub position: u8,
    pub multiplier: u8,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
    #[serde(default)]
    pub element_type: Option<u8>,
    #[serde(default)]
    pub selling_price: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub name: String,
    #[serde(default)]
    pub status_for_entry: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chip {
    pub fn is_available(&self) -> bool {
        self.status_for_entry == "available"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStatus {
    #[serde(default)]
    pub bank: Option<i64>,
    // null while a wildcard or free hit is active
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub made: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransferStatus {
    pub fn free_transfers(&self) -> Option<i64> {
        self.limit.map(|limit| (limit - self.made).max(0))
    }
}

/// The authenticated `my-team` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyTeam {
    #[serde(default)]
    pub picks: Vec<Pick>,
    #[serde(default)]
    pub chips: Vec<Chip>,
    #[serde(default)]
    pub transfers: Option<TransferStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub event: u32,
    #[serde(default)]
    pub bank: i64,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub event_transfers: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub current: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl History {
    /// Bank after the most recent recorded gameweek, in tenths.
    pub fn latest_bank(&self) -> Option<i64> {
        self.current.last().map(|entry| entry.bank)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn metrics_accept_strings_numbers_and_null() {
        let raw = json!({
            "id": 7, "web_name": "Saka", "first_name": "Bukayo", "second_name": "Saka",
            "team": 1, "now_cost": 101, "element_type": 3, "status": "a",
            "ep_next": "6.2", "form": 5, "ict_index": null, "selected_by_percent": "n/a"
        });
        let player: Player = serde_json::from_value(raw).expect("player should parse");
        assert_eq!(player.ep_next, Some(6.2));
        assert_eq!(player.form, Some(5.0));
        assert_eq!(player.ict_index, None);
        assert_eq!(player.selected_by_percent, None);
        assert_eq!(player.ep_this, None);
        assert_eq!(player.full_name(), "Bukayo Saka");
    }

    #[test]
    fn failed_fetch_serializes_as_sentinel_and_back() {
        let failed: Fetched<History> = Fetched::Failed("http 403 Forbidden".to_string());
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value, json!({ "_error": "http 403 Forbidden" }));

        let back: Fetched<History> = serde_json::from_value(value).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn successful_fetch_serializes_transparently() {
        let raw = json!({ "current": [{ "event": 3, "bank": 15, "points": 61 }], "past": [] });
        let fetched: Fetched<History> = serde_json::from_value(raw).unwrap();
        assert_eq!(fetched.ok().and_then(History::latest_bank), Some(15));

        let written = serde_json::to_value(&fetched).unwrap();
        assert!(written.get(ERROR_KEY).is_none());
        assert_eq!(written["current"][0]["points"], json!(61));
        assert_eq!(written["past"], json!([]));
    }

    #[test]
    fn free_transfers_floor_at_zero_and_skip_null_limit() {
        let status: TransferStatus =
            serde_json::from_value(json!({ "limit": 1, "made": 2, "bank": 5 })).unwrap();
        assert_eq!(status.free_transfers(), Some(0));

        let wildcard: TransferStatus =
            serde_json::from_value(json!({ "limit": null, "made": 4 })).unwrap();
        assert_eq!(wildcard.free_transfers(), None);
    }

    #[test]
    fn position_codes_map_to_labels() {
        assert_eq!(position_label(1), "GK");
        assert_eq!(position_label(4), "FWD");
        assert_eq!(position_label(9), "UNK");
        for pos in Position::ALL {
            assert_eq!(Position::from_code(pos.code()), Some(pos));
        }
    }
}
