use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, RevisionError};

const GLOB_META: [char; 3] = ['*', '?', '['];

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Split a pattern list using POSIX shell quoting rules.
pub fn tokenize(patterns: &str) -> Result<Vec<String>> {
    shell_words::split(patterns).map_err(|err| {
        RevisionError::Config(format!("error parsing file pattern list - {err}"))
    })
}

pub fn is_glob(token: &str) -> bool {
    token.contains(GLOB_META)
}

/// Expand a shell-quoted pattern list into distinct paths, in token order.
///
/// Literal tokens are passed through untouched; glob tokens are expanded
/// against the filesystem with directories dropped. Directories the walk
/// cannot read are logged and left out. Relative globs are
/// anchored at `base_dir` and their matches reported relative to it.
pub fn select(patterns: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let tokens = tokenize(patterns)?;
    if tokens.is_empty() {
        return Err(RevisionError::Config(
            "no file patterns configured".to_string(),
        ));
    }

    let mut files = Vec::new();
    for token in &tokens {
        let matches = expand_token(token, base_dir)?;
        debug!("pattern \"{}\" matched {} path(s)", token, matches.len());
        files.extend(matches);
    }

    let files = distinct(files);
    if files.is_empty() {
        return Err(RevisionError::Config(format!(
            "no files matched file patterns \"{patterns}\""
        )));
    }
    Ok(files)
}

fn expand_token(token: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
    if !is_glob(token) {
        return Ok(vec![PathBuf::from(token)]);
    }

    Pattern::new(token).map_err(|err| invalid_pattern(token, err))?;

    let relative = Path::new(token).is_relative();
    let anchored = if relative {
        let base = base_dir.to_str().ok_or_else(|| {
            RevisionError::Config(format!(
                "base directory \"{}\" is not valid UTF-8",
                base_dir.display()
            ))
        })?;
        format!("{}/{}", Pattern::escape(base.trim_end_matches('/')), token)
    } else {
        token.to_string()
    };

    let paths =
        glob::glob_with(&anchored, match_options()).map_err(|err| invalid_pattern(token, err))?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(
                    "ignoring unreadable path \"{}\" while expanding \"{}\": {}",
                    err.path().display(),
                    token,
                    err.error()
                );
                continue;
            }
        };
        if path.is_dir() {
            continue;
        }
        let path = match path.strip_prefix(base_dir) {
            Ok(stripped) if relative => stripped.to_path_buf(),
            _ => path,
        };
        matches.push(path);
    }
    Ok(matches)
}

fn invalid_pattern(token: &str, err: glob::PatternError) -> RevisionError {
    RevisionError::Config(format!("error parsing file pattern \"{token}\" - {err}"))
}

/// Drop repeated paths, comparing raw path strings and keeping the first.
pub fn distinct(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen: HashSet<OsString> = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.as_os_str().to_os_string()))
        .collect()
}
