// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Credentials, article source, output, and logging flags

use crate::api::DEFAULT_API_BASE;
use crate::discovery::Target;
use crate::images::DEFAULT_IMAGE_HOST_BASE;
use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "devto-sync")]
#[command(about = "Publish local markdown articles to dev.to", long_about = None)]
#[command(version)]
pub struct Cli {
    /// dev.to API key (falls back to DEVTO_API_KEY)
    #[arg(long)]
    pub devto_api_key: Option<String>,

    /// Imgur client id; enables image rehosting (falls back to IMGUR_CLIENT_ID)
    #[arg(long)]
    pub imgur_client_id: Option<String>,

    /// Single markdown file to publish
    #[arg(long, conflicts_with = "folder")]
    pub file: Option<PathBuf>,

    /// Folder to search recursively for markdown files
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Skip files whose directory path contains this text (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Directory to save the final documents to
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Base URL prefixed onto site-relative links
    #[arg(long)]
    pub site: Option<String>,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// dev.to API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Image host API base URL
    #[arg(long, default_value = DEFAULT_IMAGE_HOST_BASE)]
    pub image_host_base: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Cli {
    pub fn target(&self) -> Result<Target> {
        match (&self.file, &self.folder) {
            (Some(file), _) => Ok(Target::File(file.clone())),
            (None, Some(folder)) => Ok(Target::Folder(folder.clone())),
            (None, None) => Err(Error::Input("one of --file or --folder is required".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder_with_ignores() {
        let cli = Cli::try_parse_from([
            "devto-sync",
            "--folder",
            "posts",
            "--ignore",
            "drafts",
            "--ignore",
            "archive",
        ])
        .unwrap();
        assert_eq!(cli.target().unwrap(), Target::Folder("posts".into()));
        assert_eq!(cli.ignore, vec!["drafts", "archive"]);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.api_base, "https://dev.to");
    }

    #[test]
    fn test_file_and_folder_conflict() {
        let err = Cli::try_parse_from(["devto-sync", "--file", "a.md", "--folder", "posts"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_target_is_input_error() {
        let cli = Cli::try_parse_from(["devto-sync"]).unwrap();
        assert!(matches!(cli.target(), Err(Error::Input(_))));
    }

    #[test]
    fn test_log_level_values() {
        let cli = Cli::try_parse_from(["devto-sync", "--file", "a.md", "--log-level", "debug"])
            .unwrap();
        assert_eq!(cli.log_level.as_filter(), "debug");
        assert!(Cli::try_parse_from(["devto-sync", "--log-level", "loud"]).is_err());
    }
}
