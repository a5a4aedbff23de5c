// Licensed under the Apache-2.0 license

//! Main generation pipeline: load, validate, derive, render, write.
//!
//! The implementation is split across submodules:
//! - `parse`: JSON document to [`RegisterMapSet`]
//! - `validate`: register address and bitfield overlap detection
//! - `generate`: derivation of the [`ValidatedModel`]

mod generate;
mod parse;
mod validate;


pub use generate::{field_mask, validate_and_derive};
pub use validate::{validate, validate_map};

use anyhow::{bail, Context};
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, MalformedInputError};
use crate::output::{SkippedMap, ValidatedModel};
use crate::render::{renderers, Artifact};
use crate::types::RegisterMapSet;
use crate::writer::ArtifactWriter;

/// Absolute address of a register. The loader rejects inputs where this
/// would overflow.
pub fn absolute_address(base_address: u64, offset: u64) -> u64 {
    base_address.wrapping_add(offset)
}

/// Parse a JSON register map document.
pub fn load_register_maps(json: &str) -> Result<RegisterMapSet, MalformedInputError> {
    parse::load_str(json)
}

/// Read and parse a JSON register map document.
pub fn load_register_maps_from_file(path: &Path) -> Result<RegisterMapSet, GeneratorError> {
    let json = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
    let set = load_register_maps(&json)?;
    debug!("Loaded {} register map(s) from {}", set.maps.len(), path.display());
    Ok(set)
}

/// Rendered artifacts together with the model they were rendered from.
#[derive(Clone, Debug)]
pub struct Generated {
    pub model: ValidatedModel,
    pub artifacts: Vec<Artifact>,
}

impl Generated {
    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}

/// Validate `set` and run every enabled renderer over it, in memory.
pub fn generate(set: &RegisterMapSet, config: &GeneratorConfig) -> anyhow::Result<Generated> {
    config.check()?;
    let model = validate_and_derive(set, config)?;
    let mut artifacts = Vec::new();
    for renderer in renderers(config) {
        let output = renderer
            .render(&model)
            .with_context(|| format!("rendering {} output", renderer.name()))?;
        debug!(
            "Renderer {} produced {} artifact(s)",
            renderer.name(),
            output.artifacts.len()
        );
        artifacts.extend(output.artifacts);
    }

    let mut names = HashSet::new();
    if let Some(dup) = artifacts.iter().find(|a| !names.insert(a.file_name.as_str())) {
        bail!(
            "two artifacts are named {}; choose a different markdown_file or file_suffix",
            dup.file_name
        );
    }
    Ok(Generated { model, artifacts })
}

/// Load, validate and render a JSON document held in memory.
pub fn generate_from_str(json: &str, config: &GeneratorConfig) -> anyhow::Result<Generated> {
    let set = load_register_maps(json)?;
    generate(&set, config)
}

/// Outcome of a run that wrote files.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Paths written, in render order.
    pub written: Vec<PathBuf>,
    /// Maps left out under [`OverlapPolicy::SkipMap`](crate::config::OverlapPolicy::SkipMap).
    pub skipped: Vec<SkippedMap>,
}

/// Generate every artifact for `input` into `out_dir`.
///
/// Nothing is written unless loading, validation and every renderer
/// succeeded.
pub fn generate_from_file(
    input: &Path,
    out_dir: &Path,
    config: &GeneratorConfig,
) -> anyhow::Result<RunSummary> {
    info!("Generating register maps from {}", input.display());
    let set = load_register_maps_from_file(input)?;
    let generated = generate(&set, config)?;

    let writer = ArtifactWriter::new(out_dir)?;
    let written = writer.write_all(&generated.artifacts)?;
    Ok(RunSummary {
        written,
        skipped: generated.model.skipped().to_vec(),
    })
}

/// Load and validate `input` without rendering anything.
pub fn check_file(input: &Path, config: &GeneratorConfig) -> Result<ValidatedModel, GeneratorError> {
    let set = load_register_maps_from_file(input)?;
    Ok(validate_and_derive(&set, config)?)
}
