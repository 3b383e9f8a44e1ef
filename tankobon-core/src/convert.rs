//! External conversion of a combined archive to Kindle format.
//!
//! A `ComicInfo.xml` descriptor is appended to the archive first, then KCC
//! (Kindle Comic Converter) is invoked as a child process. The converted file
//! appears next to the archive as a side effect of the tool.

use std::fs::OpenOptions;
use std::io::Write;
use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::errors::{Error, Result};
use crate::metadata::MangaMetadata;

/// External converter collaborator injected into the pipeline.
pub trait Converter {
    /// Converts the combined archive at `archive`, embedding the metadata
    /// descriptor first. Synchronous, single attempt, no retry.
    ///
    /// ## Errors
    ///
    /// Fails when the descriptor can't be embedded, the tool can't be
    /// started, or it exits with a nonzero status.
    fn convert(
        &self,
        archive: &Utf8Path,
        author: &str,
        title: &str,
        metadata: &MangaMetadata,
    ) -> Result<()>;
}

/// Invokes the `kcc` executable with the Kindle Paperwhite profile in manga
/// (right-to-left) mode.
#[derive(Debug, Clone)]
pub struct KccConverter {
    program: Utf8PathBuf,
}

impl KccConverter {
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Whether the converter executable can be started at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

impl Converter for KccConverter {
    fn convert(
        &self,
        archive: &Utf8Path,
        author: &str,
        title: &str,
        metadata: &MangaMetadata,
    ) -> Result<()> {
        embed_comic_info(archive, metadata)?;

        let mut command = Command::new(&self.program);
        command
            .args(["-p", "KPW5", "-f", "MOBI", "-m", "--stretch"])
            .args(["--author", author])
            .args(["--title", title])
            .arg("--dedupecover")
            .arg(archive);

        info!("running converter: {command:?}");

        let status = command.status().map_err(|source| Error::ConverterSpawn {
            program: self.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(Error::ConverterStatus(status));
        }

        info!(
            "conversion succeeded for '{}'",
            archive.file_name().unwrap_or_default()
        );

        Ok(())
    }
}

/// Appends a `ComicInfo.xml` entry built from the metadata to the archive.
///
/// ## Errors
///
/// Fails when the archive can't be opened for appending or written.
pub fn embed_comic_info(archive: &Utf8Path, metadata: &MangaMetadata) -> Result<()> {
    let file = OpenOptions::new().read(true).write(true).open(archive)?;

    let mut writer = ZipWriter::new_append(file).map_err(|source| Error::CorruptArchive {
        path: archive.to_owned(),
        source,
    })?;
    writer.start_file("ComicInfo.xml", FileOptions::default())?;
    writer.write_all(comic_info_xml(metadata).as_bytes())?;
    writer.finish()?;

    debug!(
        "added ComicInfo.xml to '{}'",
        archive.file_name().unwrap_or_default()
    );

    Ok(())
}

pub(crate) fn comic_info_xml(metadata: &MangaMetadata) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <ComicInfo>\n\
         \x20 <Series>{}</Series>\n\
         \x20 <Summary>{}</Summary>\n\
         </ComicInfo>\n",
        escape_xml(&metadata.title),
        escape_xml(&metadata.summary),
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
