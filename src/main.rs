use anyhow::Result;
use clap::Parser;

use obs_release::cli::{run_release, Action, ReleaseArgs};
use obs_release::{config, logging, ui};

#[derive(clap::Parser)]
#[command(
    name = "obs-release",
    version,
    about = "Branch build-service projects and bump packaging for a new release"
)]
struct Args {
    #[arg(long, value_name = "X.Y.Z", help = "The version to release")]
    target_version: String,

    #[arg(
        short,
        long = "action",
        value_enum,
        default_value = "validate",
        help = "Action to run; repeat to run several in order"
    )]
    action: Vec<Action>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(
        long,
        conflicts_with = "execute",
        help = "Preview what would happen without changing the build service (default)"
    )]
    dry_run: bool,

    #[arg(long, help = "Write to the build service and commit for real")]
    execute: bool,

    #[arg(short, long, help = "Print debug diagnostics")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    logging::init_logging(args.verbose)?;

    let config = config::load_config(args.config.as_deref())?;

    let release_args = ReleaseArgs {
        target_version: args.target_version,
        actions: args.action,
        force: args.force,
        dry_run: args.dry_run || !args.execute,
    };

    let summaries = run_release(&release_args, &config)?;
    ui::display_success(&format!(
        "Finished {} action(s) for {}",
        summaries.len(),
        release_args.target_version
    ));
    Ok(())
}
