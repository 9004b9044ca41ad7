use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{Result, RevisionError};

pub const DEFAULT_REVISION_VAR: &str = "FILE_REV";

/// What to do with selected entries that are not regular files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum NonRegularPolicy {
    #[default]
    Skip,
    Fail,
}

impl fmt::Display for NonRegularPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonRegularPolicy::Skip => f.write_str("skip"),
            NonRegularPolicy::Fail => f.write_str("fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionConfig {
    pub patterns: String,
    pub base_dir: PathBuf,
    pub non_regular: NonRegularPolicy,
}

impl RevisionConfig {
    pub fn new(patterns: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            patterns: patterns.into(),
            base_dir: base_dir.into(),
            non_regular: NonRegularPolicy::default(),
        }
    }

    pub fn with_non_regular(mut self, policy: NonRegularPolicy) -> Self {
        self.non_regular = policy;
        self
    }

    pub fn from_cli(cli: &Cli, cwd: &Path) -> Result<Self> {
        let patterns = non_blank(cli.files.as_deref())
            .ok_or_else(|| RevisionError::Config("no file patterns configured (FILES)".into()))?;

        let base_dir = match &cli.base_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };

        Ok(Self::new(patterns, base_dir).with_non_regular(cli.non_regular))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub api_url: String,
    pub key: String,
}

impl PublishConfig {
    /// `None` when no coordination service is configured.
    pub fn from_cli(cli: &Cli) -> Option<Self> {
        let api_url = non_blank(cli.api_url.as_deref())?;
        Some(Self {
            api_url: api_url.to_string(),
            key: revision_key(cli.revision_var.as_deref()),
        })
    }
}

pub fn revision_key(value: Option<&str>) -> String {
    non_blank(value)
        .unwrap_or(DEFAULT_REVISION_VAR)
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
