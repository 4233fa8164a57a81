//! Loading the overseas CIDR list written by regionmgr.

use splitroute_types::{AddressRange, IpFamily};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Result, RouteSyncError};

/// Reads one IPv4 CIDR block per line.
///
/// Blank lines are ignored. A missing or empty file, or any line that is not
/// an aligned IPv4 block, is an error: routing only part of a list is worse
/// than routing none of it.
pub fn load_cidr_file(path: impl AsRef<Path>) -> Result<Vec<AddressRange>> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(RouteSyncError::invalid_cidr_file(
            path,
            "file is missing or is not a regular file",
        ));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| RouteSyncError::invalid_cidr_file(path, e.to_string()))?;

    let mut blocks = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let block: AddressRange = line.parse().map_err(|e| {
            RouteSyncError::invalid_cidr_file(path, format!("line {}: {}", index + 1, e))
        })?;
        if block.family() != IpFamily::V4 {
            return Err(RouteSyncError::invalid_cidr_file(
                path,
                format!("line {}: {} is not an IPv4 block", index + 1, block),
            ));
        }
        blocks.push(block);
    }

    if blocks.is_empty() {
        return Err(RouteSyncError::invalid_cidr_file(path, "file is empty"));
    }

    info!(path = %path.display(), blocks = blocks.len(), "Loaded CIDR blocks");
    Ok(blocks)
}
