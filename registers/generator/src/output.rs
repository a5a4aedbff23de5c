// Licensed under the Apache-2.0 license

//! Validated, fully derived output model.
//!
//! This module contains the data structures handed to renderers
//! ([`ValidatedModel`], [`GeneratedRegisterMap`], [`GeneratedRegister`],
//! [`GeneratedField`]). Every address, mask and symbol name is computed once,
//! when the model is built; renderers only format it.
//!
//! ## Flow
//!
//! ```text
//! RegisterMapSet (loaded) → validate + derive → ValidatedModel → renderers
//!                                               ├── GeneratedRegisterMap[]
//!                                               │   └── GeneratedRegister[]
//!                                               │       └── GeneratedField[]
//!                                               └── SkippedMap[]
//! ```
//!
//! A [`ValidatedModel`] can only be produced by the pipeline and is never
//! mutated afterwards.

use std::fmt;

use crate::error::OverlapError;
use crate::types::Access;

//=============================================================================
// Symbols
//=============================================================================

/// Suffix of a generated symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Suffix<'a> {
    BaseAddress,
    Offset,
    Address,
    Bitshift,
    Bitwidth,
    DefaultValue,
    Mask,
    Read,
    Write,
    /// Symbolic enum value, used verbatim.
    Enum(&'a str),
}

impl Suffix<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Suffix::BaseAddress => "BASE_ADDRESS",
            Suffix::Offset => "OFFSET",
            Suffix::Address => "ADDRESS",
            Suffix::Bitshift => "BITSHIFT",
            Suffix::Bitwidth => "BITWIDTH",
            Suffix::DefaultValue => "DEFAULT_VALUE",
            Suffix::Mask => "MASK",
            Suffix::Read => "READ",
            Suffix::Write => "WRITE",
            Suffix::Enum(name) => name,
        }
    }
}

/// Prefix shared by every symbol of one map, register or bitfield, e.g.
/// `MAP1_CONTROL_REG_ENABLE`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SymbolPrefix(String);

impl SymbolPrefix {
    pub(crate) fn new(parts: &[&str]) -> Self {
        Self(parts.join("_"))
    }

    /// Full symbol name for `suffix`.
    pub fn symbol(&self, suffix: Suffix<'_>) -> String {
        format!("{}_{}", self.0, suffix.as_str())
    }
}

impl fmt::Display for SymbolPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=============================================================================
// Accessors
//=============================================================================

/// The kind of a generated accessor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessorKind {
    /// `(register & mask) >> shift`
    Read,
    /// Read-modify-write: `(register & !mask) | ((value << shift) & mask)`.
    ///
    /// Presented as a single operation, but the underlying register access is
    /// not atomic. Generated code assumes a single execution context.
    Write,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accessor {
    pub kind: AccessorKind,
    /// Symbol the renderer must use, `{MAP}_{REG}_{FIELD}_READ` or `_WRITE`.
    pub symbol: String,
}

//=============================================================================
// Generated Types
//=============================================================================

/// A bitfield with every derived fact resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedField {
    pub name: String,
    pub description: String,
    pub bitshift: u32,
    pub bitwidth: u32,
    /// `((1 << bitwidth) - 1) << bitshift`
    pub mask: u64,
    pub default_value: u64,
    /// Enum values in input order.
    pub enum_values: Vec<(String, u64)>,
    pub prefix: SymbolPrefix,
    pub read: Accessor,
    /// `None` when the owning register is read-only.
    pub write: Option<Accessor>,
}

impl GeneratedField {
    pub fn symbol(&self, suffix: Suffix<'_>) -> String {
        self.prefix.symbol(suffix)
    }

    /// Value of this field within a raw register value.
    pub fn read_value(&self, register_value: u64) -> u64 {
        (register_value & self.mask) >> self.bitshift
    }

    /// Register value after writing `field_value` into this field. Bits of
    /// `field_value` beyond the field width are discarded.
    pub fn write_value(&self, register_value: u64, field_value: u64) -> u64 {
        let shifted = field_value.checked_shl(self.bitshift).unwrap_or(0);
        (register_value & !self.mask) | (shifted & self.mask)
    }

    /// Accessors available for this field, read first.
    pub fn accessors(&self) -> impl Iterator<Item = &Accessor> {
        std::iter::once(&self.read).chain(self.write.as_ref())
    }
}

/// Symbolic form of a register address: `{MAP}_BASE_ADDRESS + {MAP}_{REG}_OFFSET`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressExpression {
    pub base_symbol: String,
    pub offset_symbol: String,
}

impl fmt::Display for AddressExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.base_symbol, self.offset_symbol)
    }
}

/// A register placed at its absolute address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedRegister {
    pub name: String,
    pub offset: u64,
    /// `base_address + offset`
    pub address: u64,
    /// Numerically equal to [`address`](Self::address).
    pub address_expression: AddressExpression,
    pub access: Access,
    pub prefix: SymbolPrefix,
    pub fields: Vec<GeneratedField>,
}

impl GeneratedRegister {
    pub fn symbol(&self, suffix: Suffix<'_>) -> String {
        self.prefix.symbol(suffix)
    }
}

/// The complete output for a single register map.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedRegisterMap {
    pub name: String,
    pub description: String,
    pub base_address: u64,
    pub prefix: SymbolPrefix,
    /// Header file name, e.g. `map1_register_map.h`.
    pub header_file: String,
    /// Source file name, e.g. `map1_register_map.c`.
    pub source_file: String,
    pub registers: Vec<GeneratedRegister>,
}

impl GeneratedRegisterMap {
    pub fn symbol(&self, suffix: Suffix<'_>) -> String {
        self.prefix.symbol(suffix)
    }

    pub fn register(&self, name: &str) -> Option<&GeneratedRegister> {
        self.registers.iter().find(|r| r.name == name)
    }
}

/// A map left out of generation under [`OverlapPolicy::SkipMap`](crate::config::OverlapPolicy::SkipMap).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedMap {
    pub name: String,
    pub error: OverlapError,
}

/// Register maps that passed validation, ready for rendering.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidatedModel {
    maps: Vec<GeneratedRegisterMap>,
    skipped: Vec<SkippedMap>,
}

impl ValidatedModel {
    pub(crate) fn new(maps: Vec<GeneratedRegisterMap>, skipped: Vec<SkippedMap>) -> Self {
        Self { maps, skipped }
    }

    /// Maps to render, in input order.
    pub fn maps(&self) -> &[GeneratedRegisterMap] {
        &self.maps
    }

    pub fn map(&self, name: &str) -> Option<&GeneratedRegisterMap> {
        self.maps.iter().find(|m| m.name == name)
    }

    /// Maps that failed validation and were left out.
    pub fn skipped(&self) -> &[SkippedMap] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(bitshift: u32, bitwidth: u32, writable: bool) -> GeneratedField {
        let prefix = SymbolPrefix::new(&["MAP", "REG", "FIELD"]);
        let mask = crate::codegen::field_mask(bitshift, bitwidth);
        GeneratedField {
            name: "FIELD".into(),
            description: String::new(),
            bitshift,
            bitwidth,
            mask,
            default_value: 0,
            enum_values: vec![],
            read: Accessor {
                kind: AccessorKind::Read,
                symbol: prefix.symbol(Suffix::Read),
            },
            write: writable.then(|| Accessor {
                kind: AccessorKind::Write,
                symbol: prefix.symbol(Suffix::Write),
            }),
            prefix,
        }
    }

    #[test]
    fn test_symbol_names() {
        let prefix = SymbolPrefix::new(&["MAP1", "CONTROL_REG", "MODE"]);
        assert_eq!(prefix.symbol(Suffix::Mask), "MAP1_CONTROL_REG_MODE_MASK");
        assert_eq!(
            prefix.symbol(Suffix::DefaultValue),
            "MAP1_CONTROL_REG_MODE_DEFAULT_VALUE"
        );
        assert_eq!(prefix.symbol(Suffix::Enum("ON")), "MAP1_CONTROL_REG_MODE_ON");
        assert_eq!(
            SymbolPrefix::new(&["MAP1"]).symbol(Suffix::BaseAddress),
            "MAP1_BASE_ADDRESS"
        );
    }

    #[test]
    fn test_read_write_value() {
        let f = field(1, 3, true);
        assert_eq!(f.mask, 0xE);
        assert_eq!(f.read_value(0xFFFF_FFF5), 0b010);
        assert_eq!(f.write_value(0xFFFF_FFFF, 0), 0xFFFF_FFF1);
        assert_eq!(f.write_value(0, 0b101), 0b1010);
        // Bits beyond the field width are truncated
        assert_eq!(f.write_value(0, 0xFF), 0xE);
    }

    #[test]
    fn test_write_read_round_trip() {
        for (shift, width) in [(0, 1), (1, 3), (4, 8), (31, 1), (0, 32), (8, 56), (0, 64)] {
            let f = field(shift, width, true);
            let field_max = crate::codegen::field_mask(0, width);
            for register in [0u64, 0x5555_5555_5555_5555, u64::MAX] {
                for value in [0u64, 1, 0xA5, 0xDEAD_BEEF, u64::MAX] {
                    let written = f.write_value(register, value);
                    assert_eq!(f.read_value(written), value & field_max);
                    // Bits outside the field are untouched
                    assert_eq!(written & !f.mask, register & !f.mask);
                }
            }
        }
    }

    #[test]
    fn test_accessors() {
        let rw = field(0, 1, true);
        let kinds: Vec<_> = rw.accessors().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AccessorKind::Read, AccessorKind::Write]);

        let ro = field(0, 1, false);
        let symbols: Vec<_> = ro.accessors().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MAP_REG_FIELD_READ"]);
    }

    #[test]
    fn test_address_expression_display() {
        let expr = AddressExpression {
            base_symbol: "MAP1_BASE_ADDRESS".into(),
            offset_symbol: "MAP1_CONTROL_REG_OFFSET".into(),
        };
        assert_eq!(
            expr.to_string(),
            "MAP1_BASE_ADDRESS + MAP1_CONTROL_REG_OFFSET"
        );
    }
}
