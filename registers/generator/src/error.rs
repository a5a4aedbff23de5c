// Licensed under the Apache-2.0 license

//! Error types produced while loading, validating and writing register maps.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One problem found in an input document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputIssue {
    /// Location in the document, e.g. `register_maps[0].registers[1].offset`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The input document could not be turned into a model.
///
/// All issues found by the loader are reported together.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("malformed register map input ({} issue(s)):{}", .issues.len(), IssueList(.issues))]
pub struct MalformedInputError {
    pub issues: Vec<InputIssue>,
}

impl MalformedInputError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![InputIssue {
                path: path.into(),
                message: message.into(),
            }],
        }
    }
}

struct IssueList<'a>(&'a [InputIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in self.0 {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

/// Two entities of one map claim the same address or the same bit, or a
/// bitfield claims bits that cannot exist.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum OverlapError {
    #[error(
        "overlap detected in register map '{map}' at register '{register}' with address 0x{address:X}"
    )]
    Register {
        map: String,
        register: String,
        address: u64,
    },
    #[error(
        "overlap detected in register map '{map}', register '{register}': bitfield '{bitfield}' claims bit {bit} which is already in use"
    )]
    Bitfield {
        map: String,
        register: String,
        bitfield: String,
        bit: u32,
    },
    #[error(
        "bitfield '{bitfield}' in register map '{map}', register '{register}' ends at bit {end_bit}, past the 64-bit limit"
    )]
    FieldRange {
        map: String,
        register: String,
        bitfield: String,
        end_bit: u64,
    },
}

impl OverlapError {
    /// Name of the map the overlap was found in.
    pub fn map(&self) -> &str {
        match self {
            OverlapError::Register { map, .. }
            | OverlapError::Bitfield { map, .. }
            | OverlapError::FieldRange { map, .. } => map,
        }
    }
}

/// Any failure of a generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),
    #[error(transparent)]
    Overlap(#[from] OverlapError),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeneratorError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_overlap_message() {
        let err = OverlapError::Register {
            map: "MAP1".into(),
            register: "STATUS_REG".into(),
            address: 0x4000_0000,
        };
        assert_eq!(
            err.to_string(),
            "overlap detected in register map 'MAP1' at register 'STATUS_REG' with address 0x40000000"
        );
        assert_eq!(err.map(), "MAP1");
    }

    #[test]
    fn test_malformed_lists_every_issue() {
        let err = MalformedInputError {
            issues: vec![
                InputIssue {
                    path: "register_maps[0].name".into(),
                    message: "missing field".into(),
                },
                InputIssue {
                    path: "register_maps[0].base_address".into(),
                    message: "\"zz\" is not a number".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("malformed register map input (2 issue(s)):"));
        assert!(text.contains("\n  - register_maps[0].name: missing field"));
        assert!(text.contains("\n  - register_maps[0].base_address: \"zz\" is not a number"));
    }
}
