use clap::{Parser, Subcommand};
use sprint_planner::{
    aggregate_stories, load_dayoffs, normalize_items, CapacityLedger, DependenciesConfig,
    DependencyGraph, DevOpsClient, ExecutorsConfig, SetupConfig, SprintCalendar, SprintReport,
    SprintScheduler, WorkItem,
};
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sprint-planner", about = "Schedules a sprint's work items onto executors and half-day slots", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load configuration, fetch work items, schedule the sprint and write
    /// the report
    Run {
        /// Directory containing setup.json, executors.json, dayoffs.json
        /// and dependencies.json
        #[arg(long, default_value = "config")]
        config: PathBuf,

        /// Read work items from a JSON snapshot instead of querying the
        /// work tracker
        #[arg(long)]
        items: Option<PathBuf>,

        /// Override the output directory from setup.json
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            items,
            output,
        } => match run(&config, items.as_deref(), output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("{err}");
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(
    config_dir: &Path,
    items_path: Option<&Path>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    info!(dir = %config_dir.display(), "loading configuration");
    let setup = SetupConfig::load(config_dir.join("setup.json"))?;
    let executors_config = ExecutorsConfig::load(config_dir.join("executors.json"))?;
    let dayoffs = load_dayoffs(config_dir.join("dayoffs.json"))?;
    let dependencies = DependenciesConfig::load(config_dir.join("dependencies.json"))?;

    let items: Vec<WorkItem> = match items_path {
        Some(path) => {
            info!(path = %path.display(), "reading work items from snapshot");
            serde_json::from_reader(File::open(path)?)?
        }
        None => {
            info!(sprint = %setup.sprint.name, "fetching work items from the tracker");
            DevOpsClient::new(&setup.devops).fetch_sprint_items(&setup.sprint, &setup.team)?
        }
    };

    let backlog = normalize_items(&items)?;
    info!(
        stories = backlog.stories.len(),
        tasks = backlog.tasks.len(),
        "backlog normalized"
    );

    let graph = DependencyGraph::resolve(&dependencies.dependencies, &backlog.task_ids());
    let calendar = SprintCalendar::new(setup.sprint.start_date, setup.sprint.end_date);
    let executors = executors_config.executors();
    let mut ledger = CapacityLedger::build(&calendar, &executors, &dayoffs);

    let scheduler = SprintScheduler::new(&backlog, &graph, &executors, &calendar);
    let outcome = scheduler.run(&mut ledger);
    info!(
        placed = outcome.placements.len(),
        rejected = outcome.rejections.len(),
        "scheduling pass finished"
    );

    let stories = aggregate_stories(&backlog, &outcome);
    let report = SprintReport::assemble(
        setup.sprint.clone(),
        setup.team.clone(),
        stories,
        &outcome,
        dayoffs,
        graph.edges(),
    );

    let output_dir = output.unwrap_or_else(|| PathBuf::from(&setup.output_dir));
    let files = report.write_files(&output_dir)?;
    for file in files {
        println!("wrote {}", file.display());
    }
    if report.rejection_count() > 0 {
        println!("{} task(s) could not be scheduled", report.rejection_count());
    }
    Ok(())
}
