use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use fpl_context::api::FplApi;
use fpl_context::config::{self, Settings};
use fpl_context::context::{RunParams, assemble};
use fpl_context::fixture_difficulty::DEFAULT_FIXTURE_WINDOW;
use fpl_context::logging::init_logging;
use fpl_context::pipeline::{self, Layout};
use fpl_context::prompt::DEFAULT_TEMPLATE;
use fpl_context::transfers::TransferConfig;

#[derive(Parser)]
#[command(name = "fpl_context")]
#[command(about = "Fetch an FPL manager's team and league data into one context file", long_about = None)]
struct Cli {
    /// FPL manager id (entry id)
    #[arg(long)]
    manager: u64,

    /// Gameweek number (event id)
    #[arg(long)]
    gw: u32,

    #[arg(long, default_value = "context.json")]
    outfile: PathBuf,

    /// Also generate a populated prompt from the template
    #[arg(long)]
    populate_prompt: bool,

    /// Prompt template (used with --populate-prompt)
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Gameweeks covered by the fixture difficulty window
    #[arg(long, default_value_t = DEFAULT_FIXTURE_WINDOW)]
    fixture_window: u32,

    #[arg(long, default_value_t = TransferConfig::default().max_suggestions)]
    max_suggestions: usize,

    /// Write the flat layout instead of the summary-first one
    #[arg(long)]
    legacy_layout: bool,
}

fn main() -> Result<()> {
    config::load_dotenv();
    init_logging();
    let cli = Cli::parse();

    let settings = Settings::from_env();
    if !settings.has_session() {
        info!("FPL_COOKIE not set, authenticated team data will be unavailable");
    }
    let api = FplApi::new(&settings)?;

    let params = RunParams {
        manager_id: cli.manager,
        gameweek: cli.gw,
        fixture_window: cli.fixture_window,
        max_suggestions: cli.max_suggestions,
    };
    let remote = pipeline::fetch_remote(&api, &params)?;
    let context = assemble(remote, &params, api.base(), Utc::now());

    let layout = if cli.legacy_layout {
        Layout::Legacy
    } else {
        Layout::Prioritized
    };
    let document = pipeline::to_document(&context, layout)?;
    pipeline::write_document(&cli.outfile, &document)?;
    println!("Wrote {}", cli.outfile.display());

    if cli.populate_prompt {
        match pipeline::populate_prompt(document, &cli.template, None) {
            Ok((path, vars)) => {
                println!("Generated populated prompt: {}", path.display());
                println!(
                    "Variables: GW={}, Bank=£{}m, FT={}, Chips={}",
                    vars.gw, vars.bank, vars.ft, vars.chips_available
                );
            }
            Err(err) => warn!(error = %format!("{err:#}"), "failed to generate populated prompt"),
        }
    }

    Ok(())
}
