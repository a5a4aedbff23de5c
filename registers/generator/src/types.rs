// Licensed under the Apache-2.0 license

//! Core data types for the register map generator.
//!
//! This module contains the in-memory representation of a loaded register map
//! document. The [`RegisterMapSet`] is the root container; it owns its maps,
//! which own their registers, which own their bitfields. There are no back
//! references and nothing is mutated once the loader has built the graph.
//!
//! ## Architecture Overview
//!
//! ```text
//! RegisterMapSet
//! └── maps: Vec<RegisterMap>          # namespace prefix + base address
//!     └── registers: Vec<Register>    # offset + access
//!         └── bitfields: Vec<Bitfield>
//!             └── enum_values: Vec<EnumValue>
//! ```
//!
//! All defaults (`access`, `default_value`) are resolved by the loader.

use std::fmt;

/// Width in bits of a register word, unless overridden in the configuration.
pub const REGISTER_WIDTH_BITS: u32 = 32;

/// Widest bit range the derivation arithmetic can represent.
pub const MAX_FIELD_END_BIT: u32 = u64::BITS;

//=============================================================================
// RegisterMapSet - Root container
//=============================================================================

/// Every register map found in one input document, in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterMapSet {
    pub maps: Vec<RegisterMap>,
}

impl RegisterMapSet {
    pub fn new(maps: Vec<RegisterMap>) -> Self {
        Self { maps }
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

//=============================================================================
// RegisterMap
//=============================================================================

/// A named collection of registers sharing one base address.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterMap {
    /// Namespace prefix for every generated symbol.
    pub name: String,
    /// Free text.
    pub description: String,
    pub base_address: u64,
    pub registers: Vec<Register>,
}

//=============================================================================
// Access
//=============================================================================

/// Software access permitted on a register.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    #[default]
    ReadWrite,
}

impl Access {
    /// Parse the textual form used in input documents.
    pub fn parse(s: &str) -> Option<Access> {
        match s {
            "read-only" => Some(Access::ReadOnly),
            "write-only" => Some(Access::WriteOnly),
            "read-write" => Some(Access::ReadWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::ReadOnly => "read-only",
            Access::WriteOnly => "write-only",
            Access::ReadWrite => "read-write",
        }
    }

    /// Whether a read-modify-write accessor may be generated.
    pub fn can_write(&self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=============================================================================
// Register
//=============================================================================

/// An addressable unit of storage at a fixed offset from its map's base.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Register {
    pub name: String,
    /// Byte offset from the map's base address.
    pub offset: u64,
    pub access: Access,
    pub bitfields: Vec<Bitfield>,
}

//=============================================================================
// Bitfield
//=============================================================================

/// A single symbolic value of a bitfield.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub value: u64,
}

/// A named, positioned sub-range of bits within a register.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bitfield {
    pub name: String,
    /// Position of the least significant bit.
    pub bitshift: u32,
    /// Number of bits, at least 1.
    pub bitwidth: u32,
    pub description: String,
    pub default_value: u64,
    /// Symbolic values in input order.
    pub enum_values: Vec<EnumValue>,
}

impl Bitfield {
    /// One past the most significant bit of this field.
    pub fn end_bit(&self) -> u64 {
        u64::from(self.bitshift) + u64::from(self.bitwidth)
    }

    /// Whether the field lies within the bits derivation can represent.
    pub fn is_representable(&self) -> bool {
        self.end_bit() <= u64::from(MAX_FIELD_END_BIT)
    }

    /// The bit positions claimed by this field, lowest first. Only meaningful
    /// for representable fields; the range is clamped at `u32::MAX`.
    pub fn bits(&self) -> std::ops::Range<u32> {
        self.bitshift..self.bitshift.saturating_add(self.bitwidth)
    }
}
