use clap::Parser;
use std::path::PathBuf;

use crate::config::NonRegularPolicy;
use crate::logging::LoggingMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "filerev")]
#[command(
    about = "Compute a revision over a set of files and publish it to the pipeline",
    long_about = None
)]
pub struct Cli {
    /// Base URL of the coordination service
    #[arg(long, env = "REEVE_API")]
    pub api_url: Option<String>,

    /// Shell-quoted list of file paths and glob patterns
    #[arg(long, env = "FILES")]
    pub files: Option<String>,

    /// Variable name the revision is published under (default FILE_REV)
    #[arg(long, env = "REVISION_VAR")]
    pub revision_var: Option<String>,

    /// Skip or fail on directories, symlinks and special files
    #[arg(
        long,
        value_enum,
        env = "NON_REGULAR_FILES",
        default_value_t = NonRegularPolicy::Skip
    )]
    pub non_regular: NonRegularPolicy,

    /// Directory relative patterns are resolved against (default: cwd)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Print the revision without publishing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub debug: bool,

    #[arg(
        long,
        value_enum,
        default_value_t = LoggingMode::Stderr,
        hide = true
    )]
    pub logging_mode: LoggingMode,
}
