// Licensed under the Apache-2.0 license

//! Utility functions for identifier checks and C literal formatting.

/// Returns true if `name` can be pasted into a C identifier.
///
/// # Examples
/// ```
/// use mcu_regmap_generator::util::is_identifier_fragment;
/// assert!(is_identifier_fragment("CONTROL_REG"));
/// assert!(is_identifier_fragment("2ND"));
/// assert!(!is_identifier_fragment("CONTROL REG"));
/// assert!(!is_identifier_fragment(""));
/// ```
pub fn is_identifier_fragment(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true if `name` is a valid C identifier on its own.
///
/// Map names start every generated symbol, so they must not begin with a
/// digit.
pub fn is_identifier(name: &str) -> bool {
    is_identifier_fragment(name) && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Formats an integer as an uppercase C hex literal.
///
/// # Examples
/// ```
/// use mcu_regmap_generator::util::c_hex;
/// assert_eq!(c_hex(0), "0x0");
/// assert_eq!(c_hex(0xe), "0xE");
/// ```
pub fn c_hex(val: u64) -> String {
    format!("0x{val:X}")
}

/// Formats an address as a zero-padded hex literal: 8 digits for 32-bit
/// addresses, 16 digits otherwise.
///
/// # Examples
/// ```
/// use mcu_regmap_generator::util::c_address;
/// assert_eq!(c_address(0x4000_0000), "0x40000000");
/// assert_eq!(c_address(0x4), "0x00000004");
/// ```
pub fn c_address(val: u64) -> String {
    if val > u32::MAX as u64 {
        format!("0x{val:016X}")
    } else {
        format!("0x{val:08X}")
    }
}

/// Include guard for a generated header file name, e.g.
/// `map1_register_map.h` becomes `MAP1_REGISTER_MAP_H`.
pub fn include_guard(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert!(is_identifier("MAP1"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("1MAP"));
        assert!(!is_identifier("MAP-1"));
        assert!(is_identifier_fragment("1MAP"));
    }

    #[test]
    fn test_c_hex() {
        assert_eq!(c_hex(0x1), "0x1");
        assert_eq!(c_hex(0xE), "0xE");
        assert_eq!(c_hex(0xFFFF_FFFF), "0xFFFFFFFF");
    }

    #[test]
    fn test_c_address() {
        assert_eq!(c_address(0x5000_0000), "0x50000000");
        assert_eq!(c_address(0x1_0000_0000), "0x0000000100000000");
    }

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("map1_register_map.h"), "MAP1_REGISTER_MAP_H");
        assert_eq!(include_guard("uart-0.h"), "UART_0_H");
    }
}
