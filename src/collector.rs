use log::{debug, info};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::NonRegularPolicy;
use crate::error::{IoOp, Result, RevisionError};
use crate::fs::{EntryKind, FileSystem};
use crate::record::FileRecord;

#[derive(Debug, Default)]
pub struct Collection {
    pub records: Vec<FileRecord>,
    /// Resolved paths of non-regular entries skipped under `NonRegularPolicy::Skip`.
    pub skipped: Vec<PathBuf>,
}

/// Read every selected path into a `FileRecord`, in selection order.
///
/// Paths that resolve to an already collected path are read once. Any
/// failure aborts the whole collection.
pub fn collect<P: AsRef<Path>>(
    paths: &[P],
    fs: &dyn FileSystem,
    policy: NonRegularPolicy,
) -> Result<Collection> {
    let mut seen = HashSet::new();
    let mut collection = Collection::default();

    for selected in paths {
        let selected = selected.as_ref();
        let path = fs
            .resolve(selected)
            .map_err(|err| RevisionError::io(IoOp::Resolve, selected, err))?;

        if !seen.insert(path.clone()) {
            debug!(
                "\"{}\" resolves to already included \"{}\"",
                selected.display(),
                path.display()
            );
            continue;
        }

        let stat = fs
            .stat(&path)
            .map_err(|err| RevisionError::io(IoOp::Stat, &path, err))?;

        if stat.kind != EntryKind::Regular {
            match policy {
                NonRegularPolicy::Skip => {
                    info!(
                        "skipping non regular file \"{}\" ({})",
                        path.display(),
                        stat.kind
                    );
                    collection.skipped.push(path);
                    continue;
                }
                NonRegularPolicy::Fail => {
                    let reason = io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{} is not a regular file", stat.kind),
                    );
                    return Err(RevisionError::io(IoOp::Stat, path, reason));
                }
            }
        }

        let Some(owner) = stat.ownership else {
            return Err(RevisionError::Metadata { path });
        };

        let content = fs
            .read_all(&path)
            .map_err(|err| RevisionError::io(IoOp::Read, &path, err))?;

        info!("including file \"{}\"", selected.display());
        collection.records.push(FileRecord {
            owner_id: owner.uid,
            group_id: owner.gid,
            mode: stat.mode,
            path,
            content,
        });
    }

    Ok(collection)
}
