use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The archive itself is unreadable, as opposed to a plain I/O failure.
    #[error("corrupt archive '{path}': {source}")]
    CorruptArchive {
        path: Utf8PathBuf,
        source: zip::result::ZipError,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("path {0:?} is not valid utf-8")]
    NonUtf8Path(PathBuf),

    #[error("no cbz archives found in '{0}'")]
    NoArchives(Utf8PathBuf),

    #[error("no metadata found for '{0}'")]
    MetadataNotFound(String),

    #[error("no images collected, nothing to combine")]
    NoImages,

    #[error("archive '{0}' contains no image entries")]
    NoImageEntries(Utf8PathBuf),

    #[error("converter '{program}' could not be started: {source}")]
    ConverterSpawn {
        program: Utf8PathBuf,
        source: io::Error,
    },

    #[error("converter exited with {0}")]
    ConverterStatus(ExitStatus),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
