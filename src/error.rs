use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Resolve,
    Stat,
    Read,
}

impl IoOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoOp::Resolve => "determining absolute path for",
            IoOp::Stat => "reading file information for",
            IoOp::Read => "reading file",
        }
    }
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("error {op} \"{}\": {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading ownership information for \"{}\"", path.display())]
    Metadata { path: PathBuf },

    #[error("error encoding revision info: {0}")]
    Serialization(String),

    #[error("error setting revision var: {0}")]
    Reporting(String),
}

impl RevisionError {
    pub fn io(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        RevisionError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error kind. Status 1 is reserved for the
    /// "not configured to publish" exit.
    pub fn exit_code(&self) -> u8 {
        match self {
            RevisionError::Config(_) => 2,
            RevisionError::Io { .. } => 3,
            RevisionError::Metadata { .. } => 4,
            RevisionError::Serialization(_) => 5,
            RevisionError::Reporting(_) => 6,
        }
    }
}

pub type Result<T, E = RevisionError> = std::result::Result<T, E>;
