#![allow(dead_code)]

use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches};
use log::info;
use os_str_bytes::OsStrBytesExt;
use rand::random;
use took::Timer;

use crate::cli::{Command, GenerateArguments, SearchArguments, SolveArguments};
use crate::config::{load_config, ExperimentConfig};
use crate::io::documents::{InstanceDocument, SolutionDocument};
use crate::io::{load_instance, report_path, write_json};
use crate::lp::create_solver;
use crate::utils::logging::format_log_report;
use crate::utils::{create_seeded_rng, Random, TimeLimit};

mod cli;
mod config;
mod generator;
mod io;
mod lp;
mod problem;
mod search;
mod solver;
mod utils;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = expand_arguments(std::env::args_os())?;
    let args = cli::ProgramArguments::from_arg_matches(
        &cli::ProgramArguments::command().get_matches_from(args),
    )?;
    info!("{:?}", &args);

    let experiment = match &args.config {
        Some(path) => load_config(path)?,
        None => ExperimentConfig::default(),
    };

    let mut rng = {
        let seed_value = args.seed.unwrap_or_else(|| random::<i128>().abs());
        info!("seed: {}", seed_value);
        create_seeded_rng(seed_value)
    };

    match &args.command {
        Command::Solve(solve_args) => run_solve(solve_args, &experiment),
        Command::Generate(generate_args) => run_generate(generate_args, &experiment, &mut rng),
        Command::Search(search_args) => run_search(search_args, &experiment, &mut rng),
    }
}

/// Replaces every `@file` argument by the lines of that file, each line split on spaces.
/// Arguments given directly are kept whole.
fn expand_arguments(args: impl IntoIterator<Item = OsString>) -> anyhow::Result<Vec<OsString>> {
    let mut expanded = Vec::new();
    for arg in args {
        if !arg.starts_with(argfile::PREFIX) {
            expanded.push(arg);
            continue;
        }
        let lines = argfile::expand_args_from(
            std::iter::once(arg),
            argfile::parse_fromfile,
            argfile::PREFIX,
        )?;
        expanded.extend(
            lines
                .iter()
                .flat_map(|it| it.split(" ").map(OsString::from).collect::<Vec<_>>()),
        );
    }
    Ok(expanded)
}

fn run_solve(args: &SolveArguments, experiment: &ExperimentConfig) -> anyhow::Result<()> {
    let load_timer = Timer::new();
    let instance = load_instance(args.instance.as_deref())?;
    info!("instance loaded after {}", load_timer.took());

    let config = args.solve_config(&experiment.solve);
    let lp_solver = create_solver(
        config.backend,
        TimeLimit::from_seconds(config.time_limit_in_seconds).as_duration(),
    )?;

    info!("starting solver {}", lp_solver.name());
    let res = solver::solve(&instance, &config, lp_solver.as_ref())?;
    info!("finished after {}", res.time);

    let doc = SolutionDocument::new(&instance, &res, &config, &args.output_options());
    write_json(&doc, args.output.as_deref())
}

fn run_generate(
    args: &GenerateArguments,
    experiment: &ExperimentConfig,
    rng: &mut Random,
) -> anyhow::Result<()> {
    let config = args
        .generator
        .generator_config(&experiment.generator, args.size);
    let instance = generator::create_circle(&config, rng)?;
    info!("generated {:?}", instance);
    write_json(&InstanceDocument::from(&instance), args.output.as_deref())
}

fn run_search(
    args: &SearchArguments,
    experiment: &ExperimentConfig,
    rng: &mut Random,
) -> anyhow::Result<()> {
    let generator = args
        .generator
        .generator_config(&experiment.generator, args.size);
    let config = args.solve_config(&experiment.solve);
    let search = args.search_config(&experiment.search);
    let lp_solver = create_solver(
        config.backend,
        TimeLimit::from_seconds(config.time_limit_in_seconds).as_duration(),
    )?;

    let timer = Timer::new();
    info!(
        "searching {} circles of size {} with {}",
        search.tries,
        generator.size,
        lp_solver.name()
    );
    let report = search::run_search(&search, &generator, &config, lp_solver.as_ref(), rng)?;
    info!("{}, took: {}", format_log_report(&report), timer.took());

    let path = report_path(args.output.as_deref(), &search, &generator, config.demand_model);
    write_json(&report, path.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn plain_arguments_keep_their_spaces() -> anyhow::Result<()> {
        let args = os(&["circle-srnd", "solve", "my circle.json"]);
        assert_eq!(args.clone(), expand_arguments(args)?);
        Ok(())
    }

    #[test]
    fn argument_files_are_split_per_line_and_space() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("circle-srnd-args-{}.txt", std::process::id()));
        std::fs::write(&path, "--seed 5\nsolve\n--duals\n")?;
        let argument_file = format!("@{}", path.display());
        let expanded = expand_arguments(os(&["circle-srnd", argument_file.as_str(), "my circle.json"]));
        std::fs::remove_file(&path)?;
        assert_eq!(
            os(&["circle-srnd", "--seed", "5", "solve", "--duals", "my circle.json"]),
            expanded?
        );
        Ok(())
    }
}
