// Licensed under the Apache-2.0 license

//! Loading a JSON register map document into the data model.
//!
//! The document is first deserialized into loosely typed `Raw*` structs in
//! which every field is optional. A single conversion pass then checks all of
//! them and resolves defaults, collecting every problem it finds so that the
//! user sees the complete list in one [`MalformedInputError`].

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{InputIssue, MalformedInputError};
use crate::output::{Suffix, SymbolPrefix};
use crate::types::{
    Access, Bitfield, EnumValue, Register, RegisterMap, RegisterMapSet, MAX_FIELD_END_BIT,
};
use crate::util::{is_identifier, is_identifier_fragment};
use crate::value::Value;

//=============================================================================
// Raw document
//=============================================================================

#[derive(Deserialize)]
struct RawDocument {
    register_maps: Option<Vec<RawRegisterMap>>,
}

#[derive(Deserialize)]
struct RawRegisterMap {
    name: Option<String>,
    description: Option<String>,
    base_address: Option<Value>,
    registers: Option<Vec<RawRegister>>,
}

#[derive(Deserialize)]
struct RawRegister {
    name: Option<String>,
    offset: Option<Value>,
    access: Option<String>,
    bitfields: Option<Vec<RawBitfield>>,
}

#[derive(Deserialize)]
struct RawBitfield {
    name: Option<String>,
    bitshift: Option<Value>,
    bitwidth: Option<Value>,
    description: Option<String>,
    default_value: Option<Value>,
    #[serde(rename = "enum")]
    enum_values: Option<RawEnum>,
}

/// Enum entries in document order. Duplicate keys are kept so they can be
/// reported.
struct RawEnum(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawEnum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnumVisitor;

        impl<'de> Visitor<'de> for EnumVisitor {
            type Value = RawEnum;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of enum names to integer values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawEnum, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    entries.push((name, value));
                }
                Ok(RawEnum(entries))
            }
        }

        deserializer.deserialize_map(EnumVisitor)
    }
}

//=============================================================================
// Conversion
//=============================================================================

/// Collects issues while walking the raw document.
#[derive(Default)]
struct Issues(Vec<InputIssue>);

impl Issues {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.0.push(InputIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn required<'a, T>(&mut self, value: &'a Option<T>, path: &str, field: &str) -> Option<&'a T> {
        if value.is_none() {
            self.push(&format!("{path}.{field}"), "missing required field");
        }
        value.as_ref()
    }

    fn number(&mut self, value: Option<&Value>, path: &str) -> Option<u64> {
        value?.as_u64().map_err(|e| self.push(path, e)).ok()
    }

    fn small_number(&mut self, value: Option<&Value>, path: &str) -> Option<u32> {
        value?.as_u32().map_err(|e| self.push(path, e)).ok()
    }
}

/// Parse a JSON register map document.
pub(crate) fn load_str(json: &str) -> Result<RegisterMapSet, MalformedInputError> {
    let raw: RawDocument = serde_json::from_str(json)
        .map_err(|e| MalformedInputError::single("", format!("invalid document: {e}")))?;

    let mut issues = Issues::default();
    let Some(raw_maps) = issues.required(&raw.register_maps, "document", "register_maps") else {
        return Err(MalformedInputError { issues: issues.0 });
    };

    let mut maps = Vec::with_capacity(raw_maps.len());
    let mut map_names = HashSet::new();
    let mut file_stems = HashSet::new();
    for (i, raw_map) in raw_maps.iter().enumerate() {
        let path = format!("register_maps[{i}]");
        if let Some(name) = &raw_map.name {
            if !map_names.insert(name.clone()) {
                issues.push(&format!("{path}.name"), format!("duplicate map name '{name}'"));
            } else if !file_stems.insert(name.to_lowercase()) {
                issues.push(
                    &format!("{path}.name"),
                    format!("map name '{name}' produces the same file names as another map"),
                );
            }
        }
        if let Some(map) = convert_map(raw_map, &path, &mut issues) {
            maps.push(map);
        }
    }

    // Indices only line up with the document once every entry converted
    if issues.0.is_empty() {
        check_symbols(&maps, &mut issues);
    }

    if issues.0.is_empty() {
        Ok(RegisterMapSet::new(maps))
    } else {
        Err(MalformedInputError { issues: issues.0 })
    }
}

fn convert_map(raw: &RawRegisterMap, path: &str, issues: &mut Issues) -> Option<RegisterMap> {
    let name = issues.required(&raw.name, path, "name");
    if let Some(name) = name {
        if !is_identifier(name) {
            issues.push(
                &format!("{path}.name"),
                format!("'{name}' is not a valid identifier"),
            );
        }
    }
    let description = issues.required(&raw.description, path, "description");
    let base_address = issues.required(&raw.base_address, path, "base_address");
    let base_address = issues.number(base_address, &format!("{path}.base_address"));
    let raw_registers = issues.required(&raw.registers, path, "registers");

    let mut registers = Vec::new();
    let mut register_names = HashSet::new();
    for (i, raw_reg) in raw_registers.into_iter().flatten().enumerate() {
        let reg_path = format!("{path}.registers[{i}]");
        if let Some(reg_name) = &raw_reg.name {
            if !register_names.insert(reg_name.as_str()) {
                issues.push(
                    &format!("{reg_path}.name"),
                    format!("duplicate register name '{reg_name}'"),
                );
            }
        }
        if let Some(register) = convert_register(raw_reg, &reg_path, issues) {
            if let Some(base) = base_address {
                if base.checked_add(register.offset).is_none() {
                    issues.push(
                        &format!("{reg_path}.offset"),
                        "base_address + offset exceeds 64 bits",
                    );
                }
            }
            registers.push(register);
        }
    }

    Some(RegisterMap {
        name: name?.clone(),
        description: description?.clone(),
        base_address: base_address?,
        registers,
    })
}

fn convert_register(raw: &RawRegister, path: &str, issues: &mut Issues) -> Option<Register> {
    let name = issues.required(&raw.name, path, "name");
    if let Some(name) = name {
        if !is_identifier_fragment(name) {
            issues.push(
                &format!("{path}.name"),
                format!("'{name}' is not a valid identifier fragment"),
            );
        }
    }
    let offset = issues.required(&raw.offset, path, "offset");
    let offset = issues.number(offset, &format!("{path}.offset"));
    let access = match raw.access.as_deref() {
        None => Some(Access::default()),
        Some(text) => {
            let access = Access::parse(text);
            if access.is_none() {
                issues.push(
                    &format!("{path}.access"),
                    format!(
                        "unknown access '{text}', expected read-only, write-only or read-write"
                    ),
                );
            }
            access
        }
    };
    let raw_bitfields = issues.required(&raw.bitfields, path, "bitfields");

    let mut bitfields = Vec::new();
    let mut field_names = HashSet::new();
    for (i, raw_field) in raw_bitfields.into_iter().flatten().enumerate() {
        let field_path = format!("{path}.bitfields[{i}]");
        if let Some(field_name) = &raw_field.name {
            if !field_names.insert(field_name.as_str()) {
                issues.push(
                    &format!("{field_path}.name"),
                    format!("duplicate bitfield name '{field_name}'"),
                );
            }
        }
        if let Some(bitfield) = convert_bitfield(raw_field, &field_path, issues) {
            bitfields.push(bitfield);
        }
    }

    Some(Register {
        name: name?.clone(),
        offset: offset?,
        access: access?,
        bitfields,
    })
}

fn convert_bitfield(raw: &RawBitfield, path: &str, issues: &mut Issues) -> Option<Bitfield> {
    let name = issues.required(&raw.name, path, "name");
    if let Some(name) = name {
        if !is_identifier_fragment(name) {
            issues.push(
                &format!("{path}.name"),
                format!("'{name}' is not a valid identifier fragment"),
            );
        }
    }
    let bitshift = issues.required(&raw.bitshift, path, "bitshift");
    let bitshift = issues.small_number(bitshift, &format!("{path}.bitshift"));
    let bitwidth = issues.required(&raw.bitwidth, path, "bitwidth");
    let mut bitwidth = issues.small_number(bitwidth, &format!("{path}.bitwidth"));
    if bitwidth == Some(0) {
        issues.push(&format!("{path}.bitwidth"), "bitwidth must be at least 1");
        bitwidth = None;
    }
    if let (Some(shift), Some(width)) = (bitshift, bitwidth) {
        let fits = matches!(shift.checked_add(width), Some(end) if end <= MAX_FIELD_END_BIT);
        if !fits {
            issues.push(
                path,
                format!(
                    "bits [{shift}, {shift}+{width}) do not fit in {MAX_FIELD_END_BIT} bits"
                ),
            );
        }
    }
    let description = issues.required(&raw.description, path, "description");
    let default_value = match &raw.default_value {
        None => Some(0),
        Some(v) => issues.number(Some(v), &format!("{path}.default_value")),
    };

    let mut enum_values = Vec::new();
    let mut enum_names = HashSet::new();
    for (enum_name, value) in raw.enum_values.iter().flat_map(|e| e.0.iter()) {
        let enum_path = format!("{path}.enum.{enum_name}");
        if !is_identifier_fragment(enum_name) {
            issues.push(
                &enum_path,
                format!("'{enum_name}' is not a valid identifier fragment"),
            );
        }
        if !enum_names.insert(enum_name.as_str()) {
            issues.push(&enum_path, format!("duplicate enum name '{enum_name}'"));
        }
        if let Some(value) = issues.number(Some(value), &enum_path) {
            enum_values.push(EnumValue {
                name: enum_name.clone(),
                value,
            });
        }
    }

    Some(Bitfield {
        name: name?.clone(),
        bitshift: bitshift?,
        bitwidth: bitwidth?,
        description: description?.clone(),
        default_value: default_value?,
        enum_values,
    })
}

//=============================================================================
// Generated symbols
//=============================================================================

/// Maps each generated C symbol to the input path that produced it.
struct SymbolTable<'a> {
    owners: HashMap<String, String>,
    issues: &'a mut Issues,
}

impl SymbolTable<'_> {
    fn claim(&mut self, prefix: &SymbolPrefix, suffix: Suffix<'_>, path: &str) {
        match self.owners.entry(prefix.symbol(suffix)) {
            Entry::Occupied(owner) => self.issues.push(
                path,
                format!(
                    "generated symbol {} is also produced by {}",
                    owner.key(),
                    owner.get()
                ),
            ),
            Entry::Vacant(slot) => {
                slot.insert(path.to_string());
            }
        }
    }
}

/// Names are joined with `_`, so distinct names can still produce the same
/// symbol (register `R` field `F_X` and register `R_F` field `X`, or an enum
/// named `MASK`). Every symbol the header would define must be unique.
fn check_symbols(maps: &[RegisterMap], issues: &mut Issues) {
    let mut table = SymbolTable {
        owners: HashMap::new(),
        issues,
    };
    for (i, map) in maps.iter().enumerate() {
        let path = format!("register_maps[{i}]");
        let map_prefix = SymbolPrefix::new(&[map.name.as_str()]);
        table.claim(&map_prefix, Suffix::BaseAddress, &format!("{path}.name"));

        for (j, reg) in map.registers.iter().enumerate() {
            let reg_path = format!("{path}.registers[{j}]");
            let reg_prefix = SymbolPrefix::new(&[map.name.as_str(), reg.name.as_str()]);
            for suffix in [Suffix::Offset, Suffix::Address] {
                table.claim(&reg_prefix, suffix, &format!("{reg_path}.name"));
            }

            for (k, field) in reg.bitfields.iter().enumerate() {
                let field_path = format!("{reg_path}.bitfields[{k}]");
                let field_prefix = SymbolPrefix::new(&[
                    map.name.as_str(),
                    reg.name.as_str(),
                    field.name.as_str(),
                ]);
                let writable = reg.access.can_write().then_some(Suffix::Write);
                for suffix in [
                    Suffix::Bitshift,
                    Suffix::Bitwidth,
                    Suffix::DefaultValue,
                    Suffix::Mask,
                    Suffix::Read,
                ]
                .into_iter()
                .chain(writable)
                {
                    table.claim(&field_prefix, suffix, &format!("{field_path}.name"));
                }
                for e in &field.enum_values {
                    table.claim(
                        &field_prefix,
                        Suffix::Enum(&e.name),
                        &format!("{field_path}.enum.{}", e.name),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_paths(err: &MalformedInputError) -> Vec<&str> {
        err.issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_defaults_resolved_at_load() {
        let set = load_str(
            r#"{"register_maps": [{
                "name": "MAP2", "description": "Second", "base_address": "0x50000000",
                "registers": [{
                    "name": "CONFIG_REG", "offset": "0x00",
                    "bitfields": [{"name": "CONFIG", "bitshift": 0, "bitwidth": 4,
                                   "description": "Configuration"}]
                }]
            }]}"#,
        )
        .unwrap();
        let reg = &set.maps[0].registers[0];
        assert_eq!(reg.access, Access::ReadWrite);
        assert_eq!(reg.bitfields[0].default_value, 0);
        assert!(reg.bitfields[0].enum_values.is_empty());
        assert_eq!(set.maps[0].base_address, 0x5000_0000);
    }

    #[test]
    fn test_enum_order_preserved() {
        let set = load_str(
            r#"{"register_maps": [{
                "name": "M", "description": "", "base_address": 0,
                "registers": [{"name": "R", "offset": 0, "access": "read-only", "bitfields": [
                    {"name": "F", "bitshift": 0, "bitwidth": 2, "description": "",
                     "enum": {"ZULU": 3, "ALPHA": 0, "MIKE": "0x1"}}
                ]}]
            }]}"#,
        )
        .unwrap();
        let names: Vec<_> = set.maps[0].registers[0].bitfields[0]
            .enum_values
            .iter()
            .map(|e| (e.name.as_str(), e.value))
            .collect();
        assert_eq!(names, vec![("ZULU", 3), ("ALPHA", 0), ("MIKE", 1)]);
    }

    #[test]
    fn test_reports_every_issue() {
        let err = load_str(
            r#"{"register_maps": [{
                "description": "no name", "base_address": "0xZZ",
                "registers": [{
                    "name": "R", "offset": "4", "access": "read-sometimes",
                    "bitfields": [
                        {"name": "A", "bitshift": 0, "bitwidth": 0, "description": ""},
                        {"name": "B", "bitwidth": 1}
                    ]
                }]
            }]}"#,
        )
        .unwrap_err();
        assert_eq!(
            issue_paths(&err),
            vec![
                "register_maps[0].name",
                "register_maps[0].base_address",
                "register_maps[0].registers[0].access",
                "register_maps[0].registers[0].bitfields[0].bitwidth",
                "register_maps[0].registers[0].bitfields[1].bitshift",
                "register_maps[0].registers[0].bitfields[1].description",
            ]
        );
    }

    #[test]
    fn test_duplicate_names() {
        let err = load_str(
            r#"{"register_maps": [
                {"name": "M", "description": "", "base_address": 0, "registers": [
                    {"name": "R", "offset": 0, "bitfields": [
                        {"name": "F", "bitshift": 0, "bitwidth": 1, "description": ""},
                        {"name": "F", "bitshift": 1, "bitwidth": 1, "description": ""}
                    ]},
                    {"name": "R", "offset": 4, "bitfields": []}
                ]},
                {"name": "M", "description": "", "base_address": 0, "registers": []},
                {"name": "m", "description": "", "base_address": 0, "registers": []}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            issue_paths(&err),
            vec![
                "register_maps[0].registers[0].bitfields[1].name",
                "register_maps[0].registers[1].name",
                "register_maps[1].name",
                "register_maps[2].name",
            ]
        );
    }

    #[test]
    fn test_enum_named_like_generated_suffix() {
        let err = load_str(
            r#"{"register_maps": [{"name": "M", "description": "", "base_address": 0,
                "registers": [{"name": "R", "offset": 0, "bitfields": [
                    {"name": "F", "bitshift": 0, "bitwidth": 2, "description": "",
                     "enum": {"IDLE": 0, "MASK": 2, "READ": 1}}
                ]}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            issue_paths(&err),
            vec![
                "register_maps[0].registers[0].bitfields[0].enum.MASK",
                "register_maps[0].registers[0].bitfields[0].enum.READ",
            ]
        );
        assert!(err.issues[0].message.contains("M_R_F_MASK"));
    }

    #[test]
    fn test_write_suffix_only_reserved_when_writable() {
        let json = |access: &str| {
            format!(
                r#"{{"register_maps": [{{"name": "M", "description": "", "base_address": 0,
                    "registers": [{{"name": "R", "offset": 0, "access": "{access}",
                    "bitfields": [{{"name": "F", "bitshift": 0, "bitwidth": 1,
                                    "description": "", "enum": {{"WRITE": 1}}}}]}}]}}]}}"#
            )
        };
        assert!(load_str(&json("read-only")).is_ok());
        assert!(load_str(&json("read-write")).is_err());
    }

    #[test]
    fn test_joined_names_collide() {
        let err = load_str(
            r#"{"register_maps": [{"name": "M", "description": "", "base_address": 0,
                "registers": [
                    {"name": "R", "offset": 0, "bitfields": [
                        {"name": "F_X", "bitshift": 0, "bitwidth": 1, "description": ""}
                    ]},
                    {"name": "R_F", "offset": 4, "bitfields": [
                        {"name": "X", "bitshift": 0, "bitwidth": 1, "description": ""}
                    ]}
                ]}]}"#,
        )
        .unwrap_err();
        // Every field symbol of the second field is taken
        assert_eq!(err.issues.len(), 6);
        assert!(err
            .issues
            .iter()
            .all(|i| i.path == "register_maps[0].registers[1].bitfields[0].name"));
        assert!(err.issues[0]
            .message
            .contains("register_maps[0].registers[0].bitfields[0].name"));
    }

    #[test]
    fn test_register_named_base() {
        // M_BASE_ADDRESS is both the map base and the register address
        let err = load_str(
            r#"{"register_maps": [{"name": "M", "description": "", "base_address": 0,
                "registers": [{"name": "BASE", "offset": 0, "bitfields": []}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(issue_paths(&err), vec!["register_maps[0].registers[0].name"]);
    }

    #[test]
    fn test_symbols_collide_across_maps() {
        let err = load_str(
            r#"{"register_maps": [
                {"name": "M", "description": "", "base_address": 0, "registers": [
                    {"name": "X_Y", "offset": 0, "bitfields": []}
                ]},
                {"name": "M_X", "description": "", "base_address": 0, "registers": [
                    {"name": "Y", "offset": 0, "bitfields": []}
                ]}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            issue_paths(&err),
            vec![
                "register_maps[1].registers[0].name",
                "register_maps[1].registers[0].name",
            ]
        );
    }

    #[test]
    fn test_field_beyond_64_bits() {
        let err = load_str(
            r#"{"register_maps": [{"name": "M", "description": "", "base_address": 0,
                "registers": [{"name": "R", "offset": 0, "bitfields": [
                    {"name": "F", "bitshift": 60, "bitwidth": 8, "description": ""}
                ]}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(issue_paths(&err), vec!["register_maps[0].registers[0].bitfields[0]"]);
    }

    #[test]
    fn test_address_overflow() {
        let err = load_str(
            r#"{"register_maps": [{"name": "M", "description": "",
                "base_address": "0xFFFFFFFFFFFFFFFF",
                "registers": [{"name": "R", "offset": 4, "bitfields": []}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(issue_paths(&err), vec!["register_maps[0].registers[0].offset"]);
    }

    #[test]
    fn test_invalid_identifiers() {
        let err = load_str(
            r#"{"register_maps": [{"name": "1MAP", "description": "", "base_address": 0,
                "registers": [{"name": "MY REG", "offset": 0, "bitfields": [
                    {"name": "F-1", "bitshift": 0, "bitwidth": 1, "description": "",
                     "enum": {"ON OFF": 1}}
                ]}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.issues.len(), 4);
    }

    #[test]
    fn test_structural_errors() {
        let err = load_str("not json").unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].message.starts_with("invalid document"));

        let err = load_str("{}").unwrap_err();
        assert_eq!(issue_paths(&err), vec!["document.register_maps"]);

        let set = load_str(r#"{"register_maps": []}"#).unwrap();
        assert!(set.is_empty());
    }
}
