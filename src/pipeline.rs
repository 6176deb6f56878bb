use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde_json::Value;
use tracing::info;

use crate::api::FplApi;
use crate::catalog::Catalog;
use crate::context::{Context, RemoteData, RunParams, restructure};
use crate::prompt::{TemplateVariables, render_to_file, variables_from_context};

/// How the context document is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Summary first, raw detail last.
    Prioritized,
    /// Raw sections first, as older runs wrote them.
    Legacy,
}

/// Fetches every resource once, in order. Only the catalog is mandatory.
pub fn fetch_remote(api: &FplApi, params: &RunParams) -> Result<RemoteData> {
    info!(base = api.base(), "fetching catalog");
    let boot = api.bootstrap().context("catalog fetch failed")?;
    let catalog = Catalog::from_bootstrap(boot).context("catalog could not be mapped")?;
    info!(
        players = catalog.players().len(),
        teams = catalog.teams().len(),
        events = catalog.events().len(),
        "catalog loaded"
    );

    let gw = params.gameweek;
    let manager = params.manager_id;
    Ok(RemoteData {
        fixtures_this: api.fixtures_for_event(gw),
        fixtures_upcoming: api.upcoming_fixtures(),
        live: api.live(gw),
        public_picks: api.public_picks(manager, gw),
        history: api.history(manager),
        my_team: api.my_team(manager),
        catalog,
    })
}

pub fn to_document(context: &Context, layout: Layout) -> Result<Value> {
    match layout {
        Layout::Prioritized => serde_json::to_value(restructure(context)),
        Layout::Legacy => serde_json::to_value(context),
    }
    .context("serialize context")
}

pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(document).context("serialize context")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn load_document(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid context json in {}", path.display()))
}

/// Renders the template from a context document. Without an explicit output
/// path the prompt is written to `gw{N}_prompt.md`.
pub fn populate_prompt(
    document: Value,
    template: &Path,
    output: Option<&Path>,
) -> Result<(PathBuf, TemplateVariables)> {
    let vars = variables_from_context(document).context("could not extract prompt variables")?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| vars.default_output_path());
    render_to_file(template, &vars, &output)?;
    Ok((output, vars))
}
