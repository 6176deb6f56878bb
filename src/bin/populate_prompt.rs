use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use fpl_context::logging::init_logging;
use fpl_context::pipeline;
use fpl_context::prompt::DEFAULT_TEMPLATE;

#[derive(Parser)]
#[command(name = "populate_prompt")]
#[command(about = "Populate the FPL prompt template from an existing context file", long_about = None)]
struct Cli {
    #[arg(long, default_value = "context.json")]
    context: PathBuf,

    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Output path (default: gw{N}_prompt.md)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let document = pipeline::load_document(&cli.context)?;
    let (path, vars) = pipeline::populate_prompt(document, &cli.template, cli.output.as_deref())?;

    println!("Populated prompt written to {}", path.display());
    println!("Variables used:");
    for (name, value) in vars.pairs() {
        println!("  {name}: {value}");
    }
    Ok(())
}
