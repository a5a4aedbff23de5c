// Licensed under the Apache-2.0 license

//! Derivation of addresses, masks, symbols and accessors.
//!
//! Converts validated [`RegisterMap`]s into the [`GeneratedRegisterMap`]
//! output types. This is the only place where address and mask arithmetic
//! happens; renderers read the results.

use log::{debug, warn};

use super::{absolute_address, validate::validate_map};
use crate::config::{GeneratorConfig, OverlapPolicy};
use crate::error::OverlapError;
use crate::output::{
    Accessor, AccessorKind, AddressExpression, GeneratedField, GeneratedRegister,
    GeneratedRegisterMap, SkippedMap, Suffix, SymbolPrefix, ValidatedModel,
};
use crate::types::{Access, Bitfield, Register, RegisterMap, RegisterMapSet};

/// `((1 << bitwidth) - 1) << bitshift`, for `bitshift + bitwidth <= 64`.
///
/// # Examples
/// ```
/// use mcu_regmap_generator::field_mask;
/// assert_eq!(field_mask(0, 1), 0x1);
/// assert_eq!(field_mask(1, 3), 0xE);
/// assert_eq!(field_mask(0, 64), u64::MAX);
/// ```
pub fn field_mask(bitshift: u32, bitwidth: u32) -> u64 {
    let low = u64::MAX
        .checked_shr(u64::BITS.saturating_sub(bitwidth))
        .unwrap_or(0);
    low.checked_shl(bitshift).unwrap_or(0)
}

/// Validate every map and derive the output model.
///
/// With [`OverlapPolicy::AbortRun`] the first overlap in any map is returned
/// as an error. With [`OverlapPolicy::SkipMap`] failing maps are recorded in
/// [`ValidatedModel::skipped`] and the others are still derived.
pub fn validate_and_derive(
    set: &RegisterMapSet,
    config: &GeneratorConfig,
) -> Result<ValidatedModel, OverlapError> {
    let mut maps = Vec::with_capacity(set.maps.len());
    let mut skipped = Vec::new();

    for map in &set.maps {
        match (validate_map(map), config.overlap_policy) {
            (Ok(()), _) => maps.push(derive_map(map, config)),
            (Err(e), OverlapPolicy::AbortRun) => return Err(e),
            (Err(e), OverlapPolicy::SkipMap) => {
                warn!("Skipping register map '{}': {e}", map.name);
                skipped.push(SkippedMap {
                    name: map.name.clone(),
                    error: e,
                });
            }
        }
    }

    Ok(ValidatedModel::new(maps, skipped))
}

/// Derive the output form of one map. The map must already have passed
/// validation.
pub(crate) fn derive_map(map: &RegisterMap, config: &GeneratorConfig) -> GeneratedRegisterMap {
    debug!(
        "Deriving register map '{}' at base 0x{:x}",
        map.name, map.base_address
    );
    let prefix = SymbolPrefix::new(&[map.name.as_str()]);
    let base_symbol = prefix.symbol(Suffix::BaseAddress);
    let registers = map
        .registers
        .iter()
        .map(|reg| derive_register(map, reg, &base_symbol, config))
        .collect();

    GeneratedRegisterMap {
        name: map.name.clone(),
        description: map.description.clone(),
        base_address: map.base_address,
        prefix,
        header_file: config.header_file_name(&map.name),
        source_file: config.source_file_name(&map.name),
        registers,
    }
}

fn derive_register(
    map: &RegisterMap,
    reg: &Register,
    base_symbol: &str,
    config: &GeneratorConfig,
) -> GeneratedRegister {
    let prefix = SymbolPrefix::new(&[map.name.as_str(), reg.name.as_str()]);
    let address = absolute_address(map.base_address, reg.offset);
    debug!("  {} at 0x{address:x} ({})", reg.name, reg.access);

    let fields = reg
        .bitfields
        .iter()
        .map(|field| {
            check_field_width(map, reg, field, config.register_width);
            derive_field(map, reg, field)
        })
        .collect();

    GeneratedRegister {
        name: reg.name.clone(),
        offset: reg.offset,
        address,
        address_expression: AddressExpression {
            base_symbol: base_symbol.to_string(),
            offset_symbol: prefix.symbol(Suffix::Offset),
        },
        access: reg.access,
        prefix,
        fields,
    }
}

fn derive_field(map: &RegisterMap, reg: &Register, field: &Bitfield) -> GeneratedField {
    let prefix = SymbolPrefix::new(&[map.name.as_str(), reg.name.as_str(), field.name.as_str()]);
    let read = Accessor {
        kind: AccessorKind::Read,
        symbol: prefix.symbol(Suffix::Read),
    };
    let write = write_accessor(reg.access, &prefix);

    GeneratedField {
        name: field.name.clone(),
        description: field.description.clone(),
        bitshift: field.bitshift,
        bitwidth: field.bitwidth,
        mask: field_mask(field.bitshift, field.bitwidth),
        default_value: field.default_value,
        enum_values: field
            .enum_values
            .iter()
            .map(|e| (e.name.clone(), e.value))
            .collect(),
        prefix,
        read,
        write,
    }
}

/// The write accessor is gated on access: read-only registers get none.
fn write_accessor(access: Access, prefix: &SymbolPrefix) -> Option<Accessor> {
    access.can_write().then(|| Accessor {
        kind: AccessorKind::Write,
        symbol: prefix.symbol(Suffix::Write),
    })
}

/// Values that do not fit their field are accepted but reported.
fn check_field_width(map: &RegisterMap, reg: &Register, field: &Bitfield, register_width: u32) {
    if field.end_bit() > u64::from(register_width) {
        warn!(
            "{}.{}.{}: bits [{}, {}) extend past the {register_width}-bit register word",
            map.name,
            reg.name,
            field.name,
            field.bitshift,
            field.end_bit()
        );
    }
    let field_max = field_mask(0, field.bitwidth);
    if field.default_value > field_max {
        warn!(
            "{}.{}.{}: default value {} does not fit in {} bit(s)",
            map.name, reg.name, field.name, field.default_value, field.bitwidth
        );
    }
    for e in field.enum_values.iter().filter(|e| e.value > field_max) {
        warn!(
            "{}.{}.{}: enum value {} = {} does not fit in {} bit(s)",
            map.name, reg.name, field.name, e.name, e.value, field.bitwidth
        );
    }
}
