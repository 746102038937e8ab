use std::path::PathBuf;

use thiserror::Error;

/// Main error type for makedoc operations
#[derive(Error, Debug)]
pub enum MakedocError {
    #[error("'{}' does not seem to be inside a makedoc project (no .makedoc folder found)", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("the directory doc of '{}' is already unpacked", .0.display())]
    AlreadyUnpacked(PathBuf),

    #[error("the directory doc of '{}' is not unpacked", .0.display())]
    NotUnpacked(PathBuf),

    #[error("no packed doc entry for '{0}'")]
    MissingDocEntry(String),

    #[error("'{}' is outside the project root", .0.display())]
    OutsideRoot(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, MakedocError>;
