use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::canonical::canonicalize;
use crate::collector::collect;
use crate::config::RevisionConfig;
use crate::error::{Result, RevisionError};
use crate::fs::FileSystem;
use crate::hashing::{Revision, fingerprint};
use crate::selector::select;

#[derive(Debug, Clone, Serialize)]
pub struct IncludedFile {
    pub path: PathBuf,
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevisionReport {
    pub revision: Revision,
    pub files: Vec<IncludedFile>,
    pub skipped: Vec<PathBuf>,
}

/// Select, collect, order and hash the files named by `config`.
///
/// Glob expansion reads the real filesystem under `config.base_dir`; every
/// other file access goes through `fs`.
pub fn compute_revision(config: &RevisionConfig, fs: &dyn FileSystem) -> Result<RevisionReport> {
    let selected = select(&config.patterns, &config.base_dir)?;
    let collection = collect(&selected, fs, config.non_regular)?;

    if collection.records.is_empty() {
        return Err(RevisionError::Config(format!(
            "no regular files selected by file patterns \"{}\"",
            config.patterns
        )));
    }

    let records = canonicalize(collection.records);
    let revision = fingerprint(&records)?;
    info!(
        "computed revision {} over {} file(s), {} skipped",
        revision,
        records.len(),
        collection.skipped.len()
    );

    let files = records
        .iter()
        .map(|record| IncludedFile {
            path: record.path.clone(),
            uid: record.owner_id,
            gid: record.group_id,
            mode: record.mode,
            size: record.content.len(),
        })
        .collect();

    Ok(RevisionReport {
        revision,
        files,
        skipped: collection.skipped,
    })
}
