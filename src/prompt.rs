use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::context::{Summary, bank_tenths};
use crate::model::{Chip, Fetched, History, MyTeam, TransferStatus};

pub const DEFAULT_TEMPLATE: &str = "prompt_template.md";
pub const CHIPS_UNAVAILABLE: &str = "Data unavailable (requires authentication)";

const DEFAULT_FREE_TRANSFERS: i64 = 1;

/// What the template variables are derived from, whatever the file layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateInputs {
    pub gameweek: u32,
    pub bank_tenths: Option<i64>,
    pub transfers: Option<TransferStatus>,
    pub chips: Option<Vec<Chip>>,
}

/// A written context, in either of its two layouts.
#[derive(Debug, Clone)]
pub enum ContextShape {
    Prioritized(PrioritizedView),
    Legacy(LegacyView),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrioritizedView {
    pub summary: Summary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyView {
    pub meta: LegacyMeta,
    #[serde(default)]
    pub team_state: LegacyTeamState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyMeta {
    pub gameweek: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyTeamState {
    #[serde(default)]
    pub history: Option<Fetched<History>>,
    #[serde(default)]
    pub my_team: Option<Fetched<MyTeam>>,
}

impl ContextShape {
    /// The summary-first layout is recognised by its top-level `summary` key.
    pub fn from_value(value: Value) -> Result<Self> {
        if value.get("summary").is_some() {
            let view = serde_json::from_value(value).context("invalid summary section")?;
            Ok(ContextShape::Prioritized(view))
        } else {
            let view = serde_json::from_value(value).context("invalid flat context")?;
            Ok(ContextShape::Legacy(view))
        }
    }

    pub fn inputs(self) -> TemplateInputs {
        match self {
            ContextShape::Prioritized(view) => prioritized_inputs(view),
            ContextShape::Legacy(view) => legacy_inputs(view),
        }
    }
}

fn prioritized_inputs(view: PrioritizedView) -> TemplateInputs {
    let summary = view.summary;
    TemplateInputs {
        gameweek: summary.gameweek,
        bank_tenths: summary.bank,
        transfers: summary.transfers,
        chips: summary.chips,
    }
}

fn legacy_inputs(view: LegacyView) -> TemplateInputs {
    let history = view.team_state.history.as_ref().and_then(Fetched::ok);
    let my_team = view.team_state.my_team.as_ref().and_then(Fetched::ok);
    TemplateInputs {
        gameweek: view.meta.gameweek,
        bank_tenths: bank_tenths(history, my_team),
        transfers: my_team.and_then(|team| team.transfers.clone()),
        chips: my_team.map(|team| team.chips.clone()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables {
    pub gw: String,
    pub bank: String,
    pub ft: String,
    pub chips_available: String,
}

impl TemplateVariables {
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("GW", self.gw.as_str()),
            ("BANK", self.bank.as_str()),
            ("FT", self.ft.as_str()),
            ("CHIPS_AVAILABLE", self.chips_available.as_str()),
        ]
    }

    pub fn default_output_path(&self) -> PathBuf {
        PathBuf::from(format!("gw{}_prompt.md", self.gw))
    }
}

pub fn extract_variables(inputs: &TemplateInputs) -> Result<TemplateVariables> {
    let bank = inputs
        .bank_tenths
        .ok_or_else(|| anyhow!("bank balance missing from context"))?;

    let free_transfers = match inputs.transfers.as_ref().and_then(TransferStatus::free_transfers) {
        Some(ft) => ft,
        None => {
            warn!("using default of 1 free transfer (authentication required for accurate transfer data)");
            DEFAULT_FREE_TRANSFERS
        }
    };

    let chips_available = match inputs.chips.as_deref() {
        Some(chips) => {
            let names: Vec<&str> = chips
                .iter()
                .filter(|chip| chip.is_available())
                .map(|chip| chip.name.as_str())
                .collect();
            if names.is_empty() {
                "None".to_string()
            } else {
                names.join(", ")
            }
        }
        None => CHIPS_UNAVAILABLE.to_string(),
    };

    Ok(TemplateVariables {
        gw: inputs.gameweek.to_string(),
        bank: format!("{:.1}", bank as f64 / 10.0),
        ft: free_transfers.to_string(),
        chips_available,
    })
}

pub fn variables_from_context(value: Value) -> Result<TemplateVariables> {
    extract_variables(&ContextShape::from_value(value)?.inputs())
}

/// Literal `{{NAME}}` substitution in one left-to-right pass. Substituted text
/// is never rescanned and unknown placeholders are kept as written.
pub fn populate_template(template: &str, vars: &[(&str, &str)]) -> String {
    let placeholders: Vec<(String, &str)> = vars
        .iter()
        .map(|(name, value)| (format!("{{{{{name}}}}}"), *value))
        .collect();

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholders
            .iter()
            .find(|(placeholder, _)| tail.starts_with(placeholder.as_str()))
        {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn render_to_file(template_path: &Path, vars: &TemplateVariables, output: &Path) -> Result<()> {
    let template = fs::read_to_string(template_path)
        .with_context(|| format!("read template {}", template_path.display()))?;
    let populated = populate_template(&template, &vars.pairs());
    fs::write(output, populated).with_context(|| format!("write prompt {}", output.display()))?;
    Ok(())
}
