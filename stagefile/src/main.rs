mod summary;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use crate::summary::Summary;

#[derive(Parser, Debug)]
#[command(
    name = "stagefile",
    about = "Decode a pipeline config and print its stages and tasks",
    version
)]
struct Args {
    /// Only check that the config decodes, print nothing on success
    #[arg(short, long)]
    quiet: bool,

    /// Pipeline config file
    #[arg(default_value = "pipeline.config")]
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();
    let pipeline = stagefile_core::decode(&args.path)
        .with_context(|| format!("Could not load pipeline from {}", args.path.display()))?;
    info!(
        "Loaded {} stage(s) and {} task(s) from {}",
        pipeline.stages().len(),
        pipeline.task_count(),
        args.path.display()
    );

    if !args.quiet {
        print!("{}", Summary(&pipeline));
    }

    Ok(())
}
