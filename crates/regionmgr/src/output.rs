//! Output files: one canonical CIDR per line, no header.
//!
//! For every scope two files are produced, `<SCOPE>-domestic.txt` and
//! `<SCOPE>-overseas.txt`. Every file is first written to a `.tmp` sibling;
//! only when all of them are staged are they renamed into place, so a failed
//! run leaves the previous lists untouched.

use splitroute_ipset::AddressSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{RegionError, Result};
use crate::pipeline::RunContext;
use crate::scope::ScopeKey;

/// Writes run results into one directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn domestic_path(&self, scope: &ScopeKey) -> PathBuf {
        self.dir.join(format!("{}-domestic.txt", scope))
    }

    pub fn overseas_path(&self, scope: &ScopeKey) -> PathBuf {
        self.dir.join(format!("{}-overseas.txt", scope))
    }

    /// Writes both files for every scope in `context`.
    ///
    /// Returns the paths written, domestic before overseas, scopes in order.
    pub fn write(&self, context: &RunContext) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir).map_err(|e| RegionError::output(&self.dir, e))?;

        let mut staged = Vec::with_capacity(context.len() * 2);
        for (scope, sets) in context.iter() {
            for (path, set) in [
                (self.domestic_path(scope), &sets.domestic),
                (self.overseas_path(scope), &sets.overseas),
            ] {
                match stage(&path, set) {
                    Ok(tmp) => staged.push((tmp, path)),
                    Err(e) => {
                        discard(&staged);
                        return Err(e);
                    }
                }
            }
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, path) in staged {
            fs::rename(&tmp, &path).map_err(|e| RegionError::output(&path, e))?;
            written.push(path);
        }
        Ok(written)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Writes `set` next to `path` and returns the temporary file.
fn stage(path: &Path, set: &AddressSet) -> Result<PathBuf> {
    info!(path = %path.display(), blocks = set.len(), "Writing output file");

    let tmp = tmp_path(path);
    fs::write(&tmp, set.to_string()).map_err(|e| RegionError::output(&tmp, e))?;
    Ok(tmp)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = fs::remove_file(tmp) {
            warn!(path = %tmp.display(), "Failed to remove staged file: {}", e);
        }
    }
}
