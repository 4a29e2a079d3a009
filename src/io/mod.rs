use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::generator::GeneratorConfig;
use crate::io::documents::InstanceDocument;
use crate::problem::bounds::DemandModel;
use crate::problem::circle::CircleInstance;
use crate::search::SearchConfig;

pub mod documents;

/// Reads an instance document from `path`, or from stdin when no path is given.
pub fn load_instance(path: Option<&Path>) -> anyhow::Result<CircleInstance> {
    let mut s = String::new();
    match path {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("cannot open instance {}", path.display()))?
                .read_to_string(&mut s)?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut s)
                .context("cannot read instance from stdin")?;
        }
    }
    parse_instance(&s)
}

pub fn parse_instance(s: &str) -> anyhow::Result<CircleInstance> {
    let doc: InstanceDocument = serde_json::from_str(s).context("malformed instance document")?;
    Ok(CircleInstance::try_from(doc)?)
}

/// Pretty-prints `value` as JSON into `path`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut file = BufWriter::new(f);
            serde_json::to_writer_pretty(&mut file, value)?;
            writeln!(file)?;
            file.flush()?;
            info!("written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn report_file_name(
    search: &SearchConfig,
    generator: &GeneratorConfig,
    demand_model: DemandModel,
    time: DateTime<Utc>,
) -> String {
    format!(
        "{}tries_{}_size_{}_vmean_{:?}_vdev_{:?}_cmean_{:?}_cdev_{:?}_{}.json",
        match demand_model {
            DemandModel::SingleSourceDemand => "ssd",
            DemandModel::MultiBound => "",
        },
        search.tries,
        generator.size,
        generator.b_mean,
        generator.b_dev,
        generator.c_mean,
        generator.c_dev,
        time.format("%Y%m%dT%H%M%S"),
    )
}

/// Where a search report goes: an explicit file wins over `output_dir`, stdout otherwise.
pub fn report_path(
    output: Option<&Path>,
    search: &SearchConfig,
    generator: &GeneratorConfig,
    demand_model: DemandModel,
) -> Option<PathBuf> {
    output.map(Path::to_path_buf).or_else(|| {
        search.output_dir.as_ref().map(|dir| {
            dir.join(report_file_name(
                search,
                generator,
                demand_model,
                Utc::now(),
            ))
        })
    })
}
