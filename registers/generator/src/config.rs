// Licensed under the Apache-2.0 license

//! Configuration for artifact naming, emission and error policy.
//!
//! [`GeneratorConfig`] controls how output files are named, which artifacts
//! are produced, the register word width used for diagnostics, and what
//! happens when one map fails validation ([`OverlapPolicy`]).
//!
//! The configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! file_suffix = "_regs"
//! markdown_file = "registers.md"
//! register_width = 32
//! overlap_policy = "skip-map"
//!
//! [emit]
//! source = false
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use crate::types::REGISTER_WIDTH_BITS;

/// What to do when a register map fails validation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Abort the whole run on the first error found in any map. Nothing is
    /// generated.
    #[default]
    AbortRun,
    /// Validate every map independently and generate only the maps that pass.
    /// Failed maps are reported in the run summary.
    SkipMap,
}

/// Which artifacts a run produces.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Emit {
    pub header: bool,
    pub source: bool,
    pub markdown: bool,
}

impl Default for Emit {
    fn default() -> Self {
        Self {
            header: true,
            source: true,
            markdown: true,
        }
    }
}

/// Configuration for a generation run.
///
/// # Example
///
/// ```
/// use mcu_regmap_generator::config::{GeneratorConfig, OverlapPolicy};
///
/// let config = GeneratorConfig::with_defaults();
/// assert_eq!(config.header_file_name("MAP1"), "map1_register_map.h");
///
/// let config = GeneratorConfig::with_defaults()
///     .file_suffix("_regs")
///     .overlap_policy(OverlapPolicy::SkipMap);
/// assert_eq!(config.source_file_name("Uart0"), "uart0_regs.c");
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Appended to the lowercased map name to form the header and source
    /// file stems.
    pub file_suffix: String,

    /// File name of the consolidated documentation artifact.
    pub markdown_file: String,

    /// Register word width in bits. Fields reaching past it are accepted but
    /// reported with a warning.
    pub register_width: u32,

    pub overlap_policy: OverlapPolicy,

    pub emit: Emit,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorConfig {
    pub fn with_defaults() -> Self {
        Self {
            file_suffix: "_register_map".to_string(),
            markdown_file: "register_map.md".to_string(),
            register_width: REGISTER_WIDTH_BITS,
            overlap_policy: OverlapPolicy::AbortRun,
            emit: Emit::default(),
        }
    }

    /// Parse a configuration from TOML text. Missing keys keep their
    /// defaults.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: GeneratorConfig = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn file_suffix(mut self, suffix: &str) -> Self {
        self.file_suffix = suffix.to_string();
        self
    }

    pub fn markdown_file(mut self, name: &str) -> Self {
        self.markdown_file = name.to_string();
        self
    }

    pub fn register_width(mut self, bits: u32) -> Self {
        self.register_width = bits;
        self
    }

    pub fn overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    pub fn emit(mut self, emit: Emit) -> Self {
        self.emit = emit;
        self
    }

    /// Lowercased map name plus the configured suffix.
    pub fn file_stem(&self, map_name: &str) -> String {
        format!("{}{}", map_name.to_lowercase(), self.file_suffix)
    }

    pub fn header_file_name(&self, map_name: &str) -> String {
        format!("{}.h", self.file_stem(map_name))
    }

    pub fn source_file_name(&self, map_name: &str) -> String {
        format!("{}.c", self.file_stem(map_name))
    }

    /// Reject settings that cannot produce usable output.
    pub fn check(&self) -> anyhow::Result<()> {
        if self.register_width == 0 || self.register_width > u64::BITS {
            anyhow::bail!(
                "register_width must be between 1 and {}, got {}",
                u64::BITS,
                self.register_width
            );
        }
        if self.markdown_file.is_empty() || self.markdown_file.contains(['/', '\\']) {
            anyhow::bail!("markdown_file must be a plain file name, got {:?}", self.markdown_file);
        }
        if self.file_suffix.contains(['/', '\\']) {
            anyhow::bail!("file_suffix must not contain path separators");
        }
        Ok(())
    }
}
