// Licensed under the Apache-2.0 license

//! Register map generation commands.

use anyhow::{bail, Result};
use mcu_regmap_generator::{check_file, generate_from_file, GeneratorConfig, OverlapPolicy};
use std::path::Path;

use crate::ConfigArgs;

/// Build the generator configuration from `--config` and command line
/// overrides.
fn load_config(options: &ConfigArgs) -> Result<GeneratorConfig> {
    let mut config = match &options.config {
        Some(path) => GeneratorConfig::from_toml_file(path)?,
        None => GeneratorConfig::with_defaults(),
    };

    if options.skip_invalid_maps {
        config = config.overlap_policy(OverlapPolicy::SkipMap);
    }
    if let Some(suffix) = &options.file_suffix {
        config = config.file_suffix(suffix);
    }
    if let Some(name) = &options.markdown_file {
        config = config.markdown_file(name);
    }
    if let Some(bits) = options.register_width {
        config = config.register_width(bits);
    }
    config.check()?;
    Ok(config)
}

/// Generate every artifact for `input` into `out_dir`.
pub fn generate(input: &Path, out_dir: &Path, options: &ConfigArgs) -> Result<()> {
    let config = load_config(options)?;
    println!("Generating register maps from: {}", input.display());

    let summary = generate_from_file(input, out_dir, &config)?;

    for path in &summary.written {
        println!("  {}", path.display());
    }
    println!(
        "Generated {} file(s) in {}",
        summary.written.len(),
        out_dir.display()
    );
    for skipped in &summary.skipped {
        eprintln!("Skipped register map {}: {}", skipped.name, skipped.error);
    }
    Ok(())
}

/// Validate `input` and report what would be generated.
pub fn check(input: &Path, options: &ConfigArgs) -> Result<()> {
    let config = load_config(options)?;
    let model = check_file(input, &config)?;

    for map in model.maps() {
        let fields: usize = map.registers.iter().map(|r| r.fields.len()).sum();
        println!(
            "{}: {} register(s), {} bitfield(s) -> {}, {}",
            map.name,
            map.registers.len(),
            fields,
            map.header_file,
            map.source_file
        );
    }
    for skipped in model.skipped() {
        eprintln!("{}: {}", skipped.name, skipped.error);
    }
    if !model.skipped().is_empty() {
        bail!(
            "{} of {} register map(s) failed validation",
            model.skipped().len(),
            model.skipped().len() + model.maps().len()
        );
    }
    println!("{}: OK", input.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "file_suffix = \"_regs\"\nmarkdown_file = \"doc.md\"").unwrap();

        let options = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            skip_invalid_maps: true,
            file_suffix: None,
            markdown_file: Some("REGISTERS.md".into()),
            register_width: None,
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.file_suffix, "_regs");
        assert_eq!(config.markdown_file, "REGISTERS.md");
        assert_eq!(config.overlap_policy, OverlapPolicy::SkipMap);
    }

    #[test]
    fn test_bad_width_rejected() {
        let options = ConfigArgs {
            register_width: Some(0),
            ..Default::default()
        };
        assert!(load_config(&options).is_err());
    }
}
