// Licensed under the Apache-2.0 license

//! Writing rendered artifacts to an output directory.
//!
//! Writing happens in two phases. Every artifact of a batch is first written
//! to a temporary file inside the destination directory; if anything fails
//! there, the temporary files are removed and nothing of the batch becomes
//! visible. Once all of them are complete they are renamed into place one by
//! one. A failed rename leaves the artifacts renamed before it in place; they
//! are logged, and the error names the artifact that failed.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::GeneratorError;
use crate::render::Artifact;

pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer for `out_dir`, creating the directory if needed.
    pub fn new(out_dir: &Path) -> Result<Self, GeneratorError> {
        fs::create_dir_all(out_dir).map_err(|e| GeneratorError::io(out_dir, e))?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
        })
    }

    /// Write every artifact, returning the final paths in input order.
    pub fn write_all(&self, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, GeneratorError> {
        let staged = self.stage_all(artifacts)?;
        persist_all(staged)
    }

    fn stage_all(
        &self,
        artifacts: &[Artifact],
    ) -> Result<Vec<(NamedTempFile, PathBuf)>, GeneratorError> {
        let mut names = HashSet::new();
        let mut staged = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let target = self.out_dir.join(&artifact.file_name);
            if !names.insert(artifact.file_name.as_str()) {
                return Err(GeneratorError::io(
                    target,
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "more than one artifact in the batch has this name",
                    ),
                ));
            }
            let temp = self.stage(artifact, &target)?;
            staged.push((temp, target));
        }
        Ok(staged)
    }

    fn stage(&self, artifact: &Artifact, target: &Path) -> Result<NamedTempFile, GeneratorError> {
        if Path::new(&artifact.file_name).file_name() != Some(OsStr::new(&artifact.file_name)) {
            return Err(GeneratorError::io(
                target,
                io::Error::new(io::ErrorKind::InvalidInput, "not a plain file name"),
            ));
        }
        if target.is_dir() {
            return Err(GeneratorError::io(
                target,
                io::Error::new(io::ErrorKind::AlreadyExists, "a directory is in the way"),
            ));
        }
        debug!(
            "Staging {} ({} bytes)",
            target.display(),
            artifact.contents.len()
        );
        let mut temp = tempfile::Builder::new()
            .prefix(".regmap-")
            .suffix(".tmp")
            .tempfile_in(&self.out_dir)
            .map_err(|e| GeneratorError::io(&self.out_dir, e))?;
        temp.write_all(artifact.contents.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| GeneratorError::io(target, e))?;
        Ok(temp)
    }
}

/// Rename staged files into place. Temporary files not yet renamed are
/// removed when an error drops them.
fn persist_all(staged: Vec<(NamedTempFile, PathBuf)>) -> Result<Vec<PathBuf>, GeneratorError> {
    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (temp, target) in staged {
        if let Err(e) = temp.persist(&target) {
            for path in &written {
                warn!("{} was written before the failure", path.display());
            }
            return Err(GeneratorError::io(&target, e.error));
        }
        info!("Wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}
