// Licensed under the Apache-2.0 license

//! Overlap detection.
//!
//! Each map is walked once in declaration order. Every register's absolute
//! address is checked against the addresses seen so far in the same map, and
//! its bitfields are checked against each other, before moving on to the next
//! register. The first violation is returned. Bitfields reaching past bit 64
//! are rejected before their bits are expanded.
//!
//! The register word width is not enforced here: a field may extend past it.

use log::debug;
use std::collections::HashSet;

use super::absolute_address;
use crate::error::OverlapError;
use crate::types::{Register, RegisterMap};

/// Check every map, stopping at the first overlap found anywhere.
pub fn validate(maps: &[RegisterMap]) -> Result<(), OverlapError> {
    maps.iter().try_for_each(validate_map)
}

/// Check a single map for register address and bitfield overlaps.
pub fn validate_map(map: &RegisterMap) -> Result<(), OverlapError> {
    debug!(
        "Validating register map '{}' ({} registers)",
        map.name,
        map.registers.len()
    );
    let mut addresses = HashSet::with_capacity(map.registers.len());
    for reg in &map.registers {
        let address = absolute_address(map.base_address, reg.offset);
        if !addresses.insert(address) {
            return Err(OverlapError::Register {
                map: map.name.clone(),
                register: reg.name.clone(),
                address,
            });
        }
        check_bitfields(map, reg)?;
    }
    Ok(())
}

fn check_bitfields(map: &RegisterMap, reg: &Register) -> Result<(), OverlapError> {
    let mut occupied = HashSet::new();
    for field in &reg.bitfields {
        if !field.is_representable() {
            return Err(OverlapError::FieldRange {
                map: map.name.clone(),
                register: reg.name.clone(),
                bitfield: field.name.clone(),
                end_bit: field.end_bit(),
            });
        }
        for bit in field.bits() {
            if !occupied.insert(bit) {
                return Err(OverlapError::Bitfield {
                    map: map.name.clone(),
                    register: reg.name.clone(),
                    bitfield: field.name.clone(),
                    bit,
                });
            }
        }
    }
    Ok(())
}
