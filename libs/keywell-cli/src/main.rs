//! Command-line front end for the keywell case generator.
//!
//! Merges user parameter documents over the built-in defaults, builds
//! the requested models in parallel, and writes one `.scad` file per
//! model. With `--render` each file is additionally handed to an
//! external `openscad` binary for mesh export.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::Params;
use keywell_core::Model;
use log::{error, info};
use rayon::prelude::*;
use regex::Regex;

#[derive(Parser)]
#[command(version, about = "Generate a curved split-keyboard case as OpenSCAD source")]
struct Args {
    /// Parameter document (JSON) merged over the defaults; may be given
    /// multiple times, later files win
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Vec<PathBuf>,

    /// Only build models whose name matches this regular expression
    #[arg(long, value_name = "REGEX")]
    only: Option<Regex>,

    /// Render each written file to STL with the `openscad` binary
    #[arg(long)]
    render: bool,

    /// Output directory for generated files
    #[arg(short = 'o', long, default_value = "things", value_name = "DIR")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();
    let args = Args::parse();

    let params = load_params(&args.config)?;
    let mut models = keywell_core::build_models(params)?;
    if let Some(only) = &args.only {
        models.retain(|model| only.is_match(&model.name));
        if models.is_empty() {
            bail!("no model name matches {:?}", only.as_str());
        }
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {:?}", args.out))?;

    let failed: Vec<String> = models
        .par_iter()
        .filter_map(|model| match write_model(model, &args.out, args.render) {
            Ok(path) => {
                info!("wrote {}", path.display());
                None
            }
            Err(err) => {
                error!("{}: {err:#}", model.name);
                Some(model.name.clone())
            }
        })
        .collect();

    if !failed.is_empty() {
        bail!("{} model(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

/// Merge every given document over the built-in defaults, in order.
fn load_params(paths: &[PathBuf]) -> Result<Params> {
    let mut params = Params::defaults();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading parameter document {path:?}"))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing parameter document {path:?}"))?;
        params.merge(value);
    }
    Ok(params)
}

/// Write one model's scene graph as OpenSCAD source, rendering it if
/// asked to.
fn write_model(model: &Model, out: &Path, render: bool) -> Result<PathBuf> {
    let scad_path = out.join(format!("{}.scad", model.name));
    fs::write(&scad_path, keywell_scad::scad_source(&model.solid))
        .with_context(|| format!("writing {scad_path:?}"))?;
    if render {
        let stl_path = scad_path.with_extension("stl");
        let status = Command::new("openscad")
            .arg("-o")
            .arg(&stl_path)
            .arg(&scad_path)
            .status()
            .context("running openscad (is it on PATH?)")?;
        if !status.success() {
            bail!("openscad exited with {status} for {scad_path:?}");
        }
    }
    Ok(scad_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_later_documents_win() {
        let dir = std::env::temp_dir().join("keywell-cli-test-merge");
        fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.json");
        let b = dir.join("b.json");
        fs::write(&a, r#"{"clusters": {"main": {"columns": 6}}}"#).unwrap();
        fs::write(&b, r#"{"clusters": {"main": {"columns": 4}}}"#).unwrap();
        let params = load_params(&[a, b]).unwrap();
        assert_eq!(params.get_i64(&["clusters", "main", "columns"]).unwrap(), 4);
    }

    #[test]
    fn test_malformed_document_is_reported_with_its_path() {
        let dir = std::env::temp_dir().join("keywell-cli-test-bad");
        fs::create_dir_all(&dir).unwrap();
        let bad = dir.join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        let err = load_params(&[bad.clone()]).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }
}
