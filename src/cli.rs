use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::generator::GeneratorConfig;
use crate::io::documents::OutputOptions;
use crate::lp::Backend;
use crate::problem::bounds::DemandModel;
use crate::search::SearchConfig;
use crate::solver::SolveConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Capacity planning on circles (sRND): exact vs. iterative")]
pub struct ProgramArguments {
    #[arg(long, help = "rng seed")]
    pub seed: Option<i128>,

    #[arg(long, help = "TOML file with defaults for the generator, solve and search settings")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve a single circle instance
    Solve(SolveArguments),
    /// Create a random circle instance
    Generate(GenerateArguments),
    /// Search for instances where the iterative solution is far from optimal
    Search(SearchArguments),
}

#[derive(clap::Args, Clone, Debug)]
pub struct SolverArguments {
    #[arg(long, value_enum, help = "optimization backend (default: microlp)")]
    pub backend: Option<Backend>,

    #[arg(long, help = "time limit per optimization call (default: unlimited)")]
    pub time_limit_in_seconds: Option<f64>,

    #[arg(long, help = "use the single source demand problem variation")]
    pub single_source_demand: bool,
}

impl SolverArguments {
    fn apply(&self, config: &mut SolveConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.time_limit_in_seconds.is_some() {
            config.time_limit_in_seconds = self.time_limit_in_seconds;
        }
        if self.single_source_demand {
            config.demand_model = DemandModel::SingleSourceDemand;
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct SolveArguments {
    #[arg(help = "instance file (default: stdin)")]
    pub instance: Option<PathBuf>,

    #[arg(short, long, help = "solution file (default: stdout)")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "solve the relaxation and output the dual values")]
    pub duals: bool,

    #[arg(long, help = "output the optimization problem")]
    pub show_constraints: bool,

    #[arg(long, help = "also run the iterative solver and compare")]
    pub compare_iterative: bool,

    #[arg(long, help = "output every level of the iterative solver (implies --compare-iterative)")]
    pub show_iterative_steps: bool,

    #[arg(long, help = "only output objective values, no capacities")]
    pub only_results: bool,

    #[arg(long, help = "add the instance to the output")]
    pub add_declaration: bool,

    #[command(flatten)]
    pub solver: SolverArguments,
}

impl SolveArguments {
    pub fn solve_config(&self, base: &SolveConfig) -> SolveConfig {
        let mut config = base.clone();
        self.solver.apply(&mut config);
        config.duals |= self.duals;
        config.compare_iterative |= self.compare_iterative || self.show_iterative_steps;
        config
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            only_results: self.only_results,
            show_constraints: self.show_constraints,
            show_steps: self.show_iterative_steps,
            add_declaration: self.add_declaration,
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct GeneratorArguments {
    #[arg(short = 'm', long, help = "mean distance of the low and high values to 0")]
    pub distance_mean: Option<f64>,

    #[arg(short = 'd', long, help = "standard deviation of the low and high values")]
    pub standard_deviation: Option<f64>,

    #[arg(short = 'c', long, help = "mean of the edge costs")]
    pub cost_mean: Option<f64>,

    #[arg(short = 's', long, help = "standard deviation of the edge costs")]
    pub cost_standard_deviation: Option<f64>,

    #[arg(long, help = "draw low and high from {-1, 0, 1}")]
    pub binary: bool,
}

impl GeneratorArguments {
    pub fn generator_config(&self, base: &GeneratorConfig, size: Option<usize>) -> GeneratorConfig {
        GeneratorConfig {
            size: size.unwrap_or(base.size),
            b_mean: self.distance_mean.unwrap_or(base.b_mean),
            b_dev: self.standard_deviation.unwrap_or(base.b_dev),
            c_mean: self.cost_mean.unwrap_or(base.c_mean),
            c_dev: self.cost_standard_deviation.unwrap_or(base.c_dev),
            binary: base.binary || self.binary,
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct GenerateArguments {
    #[arg(help = "size of the circle")]
    pub size: Option<usize>,

    #[arg(short, long, help = "instance file (default: stdout)")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArguments,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SearchArguments {
    #[arg(help = "how many instances should be tried")]
    pub tries: Option<usize>,

    #[arg(help = "size of the circles")]
    pub size: Option<usize>,

    #[arg(long, help = "report file (default: stdout)", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    #[arg(short = 'o', long, help = "write a conveniently named report file into this directory")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArguments,

    #[command(flatten)]
    pub solver: SolverArguments,
}

impl SearchArguments {
    pub fn search_config(&self, base: &SearchConfig) -> SearchConfig {
        SearchConfig {
            tries: self.tries.unwrap_or(base.tries),
            output_dir: self.output_dir.clone().or_else(|| base.output_dir.clone()),
        }
    }

    pub fn solve_config(&self, base: &SolveConfig) -> SolveConfig {
        let mut config = base.clone();
        self.solver.apply(&mut config);
        config
    }
}
