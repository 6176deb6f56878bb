use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::fixture_difficulty::{TeamDifficulty, fixture_difficulty, upcoming_window};
use crate::model::{
    Chip, ElementType, Fetched, Fixture, History, MyTeam, Player, Team, TransferStatus,
};
use crate::squad::{SquadAnalysis, analyze_squad};
use crate::transfers::{TransferConfig, TransferSuggestion, suggest_transfers};

/// Catalogs smaller than this are probably truncated responses.
pub const MIN_CATALOG_PLAYERS: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    pub manager_id: u64,
    pub gameweek: u32,
    pub fixture_window: u32,
    pub max_suggestions: usize,
}

impl RunParams {
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            max_suggestions: self.max_suggestions,
            ..TransferConfig::default()
        }
    }
}

/// Everything fetched for one run, before any analysis.
#[derive(Debug, Clone)]
pub struct RemoteData {
    pub catalog: Catalog,
    pub fixtures_this: Fetched<Vec<Fixture>>,
    pub fixtures_upcoming: Fetched<Vec<Fixture>>,
    pub live: Fetched<Value>,
    pub public_picks: Fetched<Value>,
    pub history: Fetched<History>,
    pub my_team: Fetched<MyTeam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub generated_at_utc: String,
    pub api_base: String,
    pub manager_id: u64,
    pub gameweek: u32,
    #[serde(default)]
    pub fixture_window: Option<u32>,
    #[serde(default)]
    pub max_suggestions: Option<usize>,
}

/// Status of the requested gameweek; every field is `None` when the event
/// list does not contain it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStatus {
    pub deadline_time: Option<String>,
    pub is_current: Option<bool>,
    pub is_next: Option<bool>,
    pub finished: Option<bool>,
}

impl EventStatus {
    pub fn is_resolved(&self) -> bool {
        self.is_current.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub public_picks: Fetched<Value>,
    pub history: Fetched<History>,
    pub my_team: Fetched<MyTeam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub positions: Vec<ElementType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    pub this_gw: Fetched<Vec<Fixture>>,
    pub upcoming: Vec<Fixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub current_squad: Option<SquadAnalysis>,
    pub fixtures_difficulty: BTreeMap<String, TeamDifficulty>,
    pub transfer_suggestions: Vec<TransferSuggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub authenticated: bool,
    pub warnings: Vec<String>,
}

/// The flat context: raw sections first, derived analysis after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub meta: Meta,
    pub event: EventStatus,
    pub team_state: TeamState,
    pub market: Market,
    pub fixtures: FixtureSet,
    pub live: Fetched<Value>,
    pub analysis: Analysis,
    #[serde(default)]
    pub data_quality: DataQuality,
}

/// Headline values a reader needs first. Copies, never recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub gameweek: u32,
    pub manager_id: u64,
    pub deadline_time: Option<String>,
    /// Cash in bank, in tenths.
    pub bank: Option<i64>,
    pub transfers: Option<TransferStatus>,
    pub chips: Option<Vec<Chip>>,
    pub squad_value: Option<f64>,
    pub captain_id: Option<u32>,
    pub vice_captain_id: Option<u32>,
    pub top_transfer: Option<TransferSuggestion>,
}

/// The same data as [`Context`], ordered summary-first and raw-detail-last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityContext {
    pub summary: Summary,
    pub data_quality: DataQuality,
    pub analysis: Analysis,
    pub team_state: TeamState,
    pub fixtures: FixtureSet,
    pub event: EventStatus,
    pub market: Market,
    pub live: Fetched<Value>,
    pub meta: Meta,
}

pub fn assemble(
    remote: RemoteData,
    params: &RunParams,
    api_base: &str,
    generated_at: DateTime<Utc>,
) -> Context {
    let RemoteData {
        catalog,
        fixtures_this,
        fixtures_upcoming,
        live,
        public_picks,
        history,
        my_team,
    } = remote;

    let event = catalog
        .event(params.gameweek)
        .map(|ev| EventStatus {
            deadline_time: ev.deadline_time.clone(),
            is_current: Some(ev.is_current),
            is_next: Some(ev.is_next),
            finished: Some(ev.finished),
        })
        .unwrap_or_default();

    let upcoming = match &fixtures_upcoming {
        Fetched::Ok(list) => upcoming_window(
            list,
            params.gameweek,
            params.fixture_window,
            catalog.max_event_id(),
        ),
        Fetched::Failed(_) => Vec::new(),
    };

    let current_squad = analyze_squad(&my_team, &catalog);
    let fixtures_difficulty = fixture_difficulty(&upcoming, &catalog);
    let transfer_suggestions = match (&current_squad, bank_tenths(history.ok(), my_team.ok())) {
        (Some(squad), Some(bank)) => {
            suggest_transfers(squad, &catalog, bank, &params.transfer_config())
        }
        (Some(_), None) => {
            warn!("bank balance unavailable, skipping transfer suggestions");
            Vec::new()
        }
        (None, _) => Vec::new(),
    };
    info!(
        suggestions = transfer_suggestions.len(),
        teams_rated = fixtures_difficulty.len(),
        "analysis complete"
    );

    let mut context = Context {
        meta: Meta {
            generated_at_utc: generated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
            api_base: api_base.to_string(),
            manager_id: params.manager_id,
            gameweek: params.gameweek,
            fixture_window: Some(params.fixture_window),
            max_suggestions: Some(params.max_suggestions),
        },
        event,
        team_state: TeamState {
            public_picks,
            history,
            my_team,
        },
        market: Market {
            players: catalog.players().to_vec(),
            teams: catalog.teams().to_vec(),
            positions: catalog.positions().to_vec(),
        },
        fixtures: FixtureSet {
            this_gw: fixtures_this,
            upcoming,
        },
        live,
        analysis: Analysis {
            current_squad,
            fixtures_difficulty,
            transfer_suggestions,
        },
        data_quality: DataQuality::default(),
    };
    context.data_quality = DataQuality {
        authenticated: context.team_state.my_team.is_ok(),
        warnings: data_quality_warnings(&context),
    };
    for warning in &context.data_quality.warnings {
        warn!("{warning}");
    }
    context
}

/// Latest history bank, falling back to the authenticated transfer status.
pub fn bank_tenths(history: Option<&History>, my_team: Option<&MyTeam>) -> Option<i64> {
    history.and_then(History::latest_bank).or_else(|| {
        my_team
            .and_then(|team| team.transfers.as_ref())
            .and_then(|t| t.bank)
    })
}

pub fn data_quality_warnings(ctx: &Context) -> Vec<String> {
    let gw = ctx.meta.gameweek;
    let mut warnings = Vec::new();

    match &ctx.team_state.my_team {
        Fetched::Failed(err) => warnings.push(format!(
            "Authenticated team data unavailable ({err}); free transfers assumed to be 1 and chip status unknown"
        )),
        Fetched::Ok(team) => {
            if team.transfers.as_ref().and_then(TransferStatus::free_transfers).is_none() {
                warnings.push(
                    "Transfer limit missing from team data; free transfers assumed to be 1"
                        .to_string(),
                );
            }
        }
    }
    if ctx.analysis.current_squad.is_none() {
        warnings.push("Squad analysis unavailable; no transfer suggestions made".to_string());
    }
    match &ctx.fixtures.this_gw {
        Fetched::Failed(err) => {
            warnings.push(format!("Fixtures for gameweek {gw} could not be fetched ({err})"))
        }
        Fetched::Ok(list) if list.is_empty() => {
            warnings.push(format!("No fixtures found for gameweek {gw}"))
        }
        Fetched::Ok(_) => {}
    }
    if !ctx.event.is_resolved() {
        warnings.push(format!("Gameweek {gw} not found in the event list"));
    }
    let players = ctx.market.players.len();
    if players < MIN_CATALOG_PLAYERS {
        warnings.push(format!(
            "Player catalog has only {players} entries (expected at least {MIN_CATALOG_PLAYERS})"
        ));
    }
    if let Some(err) = ctx.team_state.history.error() {
        warnings.push(format!("Manager history unavailable ({err})"));
    }
    if let Some(err) = ctx.team_state.public_picks.error() {
        warnings.push(format!("Public picks unavailable ({err})"));
    }
    if let Some(err) = ctx.live.error() {
        warnings.push(format!("Live scores unavailable ({err})"));
    }
    warnings
}

pub fn restructure(ctx: &Context) -> PriorityContext {
    let my_team = ctx.team_state.my_team.ok();
    let squad = ctx.analysis.current_squad.as_ref();

    PriorityContext {
        summary: Summary {
            gameweek: ctx.meta.gameweek,
            manager_id: ctx.meta.manager_id,
            deadline_time: ctx.event.deadline_time.clone(),
            bank: bank_tenths(ctx.team_state.history.ok(), my_team),
            transfers: my_team.and_then(|team| team.transfers.clone()),
            chips: my_team.map(|team| team.chips.clone()),
            squad_value: squad.map(|s| s.total_squad_value),
            captain_id: squad.and_then(|s| s.captain_id),
            vice_captain_id: squad.and_then(|s| s.vice_id),
            top_transfer: ctx.analysis.transfer_suggestions.first().cloned(),
        },
        data_quality: ctx.data_quality.clone(),
        analysis: ctx.analysis.clone(),
        team_state: ctx.team_state.clone(),
        fixtures: ctx.fixtures.clone(),
        event: ctx.event.clone(),
        market: ctx.market.clone(),
        live: ctx.live.clone(),
        meta: ctx.meta.clone(),
    }
}
