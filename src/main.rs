use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{arg, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;
use transit_optimizer::{
    config::{Constraints, Objective, RunConfig},
    graph::GraphBuilder,
    gtfs,
    kpi::{KpiEvaluator, KpiReport},
    search,
    seed::SeedGenerator,
    timetable::Timetable,
};

fn cli() -> Command {
    Command::new("transit-optimizer")
        .about("Improves a transit schedule by local search")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Builds the stop graph, optimizes it and writes KPI reports")
                .arg(
                    arg!(--config [CONFIG] "Path to a run.toml; replaces the other options")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--feed [FEED] "Directory holding the unzipped feed")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required_unless_present("config"),
                )
                .arg(
                    arg!(--constraints [CONSTRAINTS] "Path to constraints JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required_unless_present("config"),
                )
                .arg(
                    arg!(--objective [OBJECTIVE] "Path to objective JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required_unless_present("config"),
                )
                .arg(
                    arg!(--outdir [OUTDIR] "Output directory")
                        .default_value("./output")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"sample-size" [SAMPLE_SIZE] "Sampling size for the evaluator")
                        .default_value("5000")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "Random seed for the evaluator")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"max-iters" [MAX_ITERS] "Local search iterations")
                        .default_value("500")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
}

fn run_config(matches: &ArgMatches) -> Result<RunConfig> {
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        return RunConfig::from_toml_file(path)
            .with_context(|| format!("Failed to read run config {}", path.display()));
    }

    let path = |id: &str| -> Result<PathBuf> {
        matches
            .get_one::<PathBuf>(id)
            .cloned()
            .with_context(|| format!("Missing --{id}"))
    };

    Ok(RunConfig {
        feed_dir: path("feed")?,
        constraints_path: path("constraints")?,
        objective_path: path("objective")?,
        output_dir: path("outdir")?,
        sample_size: matches
            .get_one::<usize>("sample-size")
            .copied()
            .unwrap_or(5000),
        seed: matches.get_one::<u64>("seed").copied(),
        max_iters: matches.get_one::<usize>("max-iters").copied().unwrap_or(500),
    })
}

fn write_json<T: serde::Serialize>(path: PathBuf, value: &T) -> Result<()> {
    fs::write(&path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

fn run(config: RunConfig) -> Result<()> {
    let constraints = Constraints::from_json_file(&config.constraints_path)
        .with_context(|| format!("Failed to read {}", config.constraints_path.display()))?;
    let objective = Objective::from_json_file(&config.objective_path)
        .with_context(|| format!("Failed to read {}", config.objective_path.display()))?;

    ensure_output_dir(&config.output_dir)?;

    info!(feed = %config.feed_dir.display(), "loading feed");
    let feed = gtfs::Timetable::from_dir(&config.feed_dir)
        .with_context(|| format!("Failed to load feed from {}", config.feed_dir.display()))?;
    let timetable = Timetable::try_from(feed)?;

    info!(stops = timetable.stops.len(), trips = timetable.trips.len(), "building graph");
    let graph = GraphBuilder::new().build(&timetable);

    let evaluator = KpiEvaluator::new(objective, config.sample_size, config.seed);
    let baseline = evaluator.compute_kpis(&graph, &timetable);
    write_json(config.output_dir.join("baseline_kpi_report.json"), &baseline)?;

    let seed = SeedGenerator::create(&graph, &timetable, &constraints, &evaluator.objective);
    let best = search::optimize(&seed, &evaluator, &constraints, config.max_iters);

    let report = KpiReport {
        baseline,
        optimized: evaluator.compute_kpis(&best.graph, &best.timetable),
    };
    write_json(config.output_dir.join("kpi_report.json"), &report)?;

    let diff_path = config.output_dir.join("scenario_diff.md");
    fs::write(&diff_path, best.diff(&constraints).to_string())
        .with_context(|| format!("Failed to write {}", diff_path.display()))?;

    info!(outdir = %config.output_dir.display(), "run completed");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("transit_optimizer=info".parse()?),
        )
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("run", sub_m)) => run(run_config(sub_m)?),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_failure_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "").unwrap();
        let target = blocker.join("reports");

        let err = ensure_output_dir(&target).unwrap_err();

        assert!(err.to_string().contains(&target.display().to_string()));
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b");

        ensure_output_dir(&target).unwrap();

        assert!(target.is_dir());
    }
}
