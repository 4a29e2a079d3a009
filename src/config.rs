use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::generator::GeneratorConfig;
use crate::search::SearchConfig;
use crate::solver::SolveConfig;

/// Defaults for all subcommands, read from a TOML file. Command line flags override them.
///
/// ```toml
/// [generator]
/// size = 8
/// b-mean = 4.0
///
/// [solve]
/// demand-model = "single-source-demand"
/// time-limit-in-seconds = 30.0
///
/// [search]
/// tries = 1000
/// output-dir = "results"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub generator: GeneratorConfig,
    pub solve: SolveConfig,
    pub search: SearchConfig,
}

pub fn load_config(path: &Path) -> anyhow::Result<ExperimentConfig> {
    let mut s = String::new();
    File::open(path)
        .with_context(|| format!("cannot open config {}", path.display()))?
        .read_to_string(&mut s)?;
    parse_config(&s).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(s: &str) -> anyhow::Result<ExperimentConfig> {
    Ok(toml::from_str(s)?)
}
