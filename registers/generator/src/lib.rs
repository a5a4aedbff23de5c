// Licensed under the Apache-2.0 license

//! JSON register map to C header, C source and Markdown generator.
//!
//! This crate reads a declarative description of memory-mapped register maps,
//! checks it for overlapping register addresses and overlapping bitfields, and
//! emits one C header and source per map plus consolidated documentation.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use mcu_regmap_generator::{generate_from_file, GeneratorConfig, OverlapPolicy};
//!
//! // Generate with defaults into ./out
//! let summary = generate_from_file(
//!     Path::new("register_map.json"),
//!     Path::new("out"),
//!     &GeneratorConfig::with_defaults(),
//! ).unwrap();
//!
//! // Or keep going past maps that fail validation
//! let config = GeneratorConfig::with_defaults()
//!     .overlap_policy(OverlapPolicy::SkipMap);
//! let summary = generate_from_file(
//!     Path::new("register_map.json"),
//!     Path::new("out"),
//!     &config,
//! ).unwrap();
//! for skipped in &summary.skipped {
//!     eprintln!("skipped {}: {}", skipped.name, skipped.error);
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: The loaded data model ([`RegisterMap`], [`Register`], [`Bitfield`])
//! - [`config`]: Run configuration ([`GeneratorConfig`], [`OverlapPolicy`])
//! - [`output`]: Validated, derived model handed to renderers
//! - [`render`]: Header, source and Markdown renderers
//! - [`writer`]: Staged writing of artifacts to disk
//! - [`error`]: Error types
//! - [`util`]: Identifier checks and C literal formatting

pub mod config;
pub mod error;
pub mod output;
pub mod render;
pub mod types;
pub mod util;
pub mod writer;

mod codegen;
mod value;

// Re-export main public API
pub use codegen::{
    absolute_address, check_file, field_mask, generate, generate_from_file, generate_from_str,
    load_register_maps, load_register_maps_from_file, validate, validate_and_derive,
    validate_map, Generated, RunSummary,
};
pub use config::{Emit, GeneratorConfig, OverlapPolicy};
pub use error::{GeneratorError, InputIssue, MalformedInputError, OverlapError};
pub use output::{
    Accessor, AccessorKind, AddressExpression, GeneratedField, GeneratedRegister,
    GeneratedRegisterMap, SkippedMap, Suffix, ValidatedModel,
};
pub use types::{Access, Bitfield, EnumValue, Register, RegisterMap, RegisterMapSet};
