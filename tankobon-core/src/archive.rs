//! Reading chapter archives: listing image entries, full extraction and the
//! first-image fallback cover.

use std::fs::File;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{glob, Pattern};
use tracing::{debug, error};
use zip::ZipArchive;

use crate::errors::{Error, Result};
use crate::metadata::CoverImage;
use crate::natsort::natural_cmp;
use crate::parse::parse_chapter_number;

/// Entry extensions treated as page images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

pub fn is_image_name(name: &str) -> bool {
    Utf8Path::new(name)
        .extension()
        .is_some_and(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(extension))
        })
}

/// One source chapter archive with its parsed chapter number.
#[derive(Debug, Clone)]
pub struct ChapterArchive {
    pub path: Utf8PathBuf,
    pub number: Option<f64>,
}

impl ChapterArchive {
    pub fn new(path: Utf8PathBuf) -> Self {
        let number = parse_chapter_number(path.file_name().unwrap_or_default());
        Self { path, number }
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    pub fn file_stem(&self) -> &str {
        self.path.file_stem().unwrap_or_default()
    }

    fn open(&self) -> Result<ZipArchive<File>> {
        let file = File::open(&self.path)?;

        ZipArchive::new(file).map_err(|source| Error::CorruptArchive {
            path: self.path.clone(),
            source,
        })
    }

    /// Lists the archive's image entry names in natural order.
    ///
    /// ## Errors
    ///
    /// Fails when the archive can't be opened or is corrupt.
    pub fn list_images(&self) -> Result<Vec<String>> {
        let archive = self.open()?;

        let mut names = archive
            .file_names()
            .filter(|name| is_image_name(name))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        names.sort_by(|a, b| natural_cmp(a, b));

        Ok(names)
    }

    /// Extracts every entry into `destination`.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::CorruptArchive`] when the zip itself is unreadable,
    /// a plain [`Error::Io`] otherwise.
    pub fn extract_to(&self, destination: &Utf8Path) -> Result<()> {
        let mut archive = self.open()?;

        archive
            .extract(destination)
            .map_err(|source| match source {
                zip::result::ZipError::Io(err) => Error::Io(err),
                source => Error::CorruptArchive {
                    path: self.path.clone(),
                    source,
                },
            })?;

        debug!("extracted '{}' to '{destination}'", self.file_name());

        Ok(())
    }

    /// Copies the naturally-first image entry into a temporary file, keeping
    /// its extension. Used as the cover when no remote cover is available.
    ///
    /// ## Errors
    ///
    /// Fails when the archive is corrupt, contains no image entries, or the
    /// temporary file can't be written.
    pub fn extract_first_image(&self) -> Result<CoverImage> {
        let images = self.list_images()?;
        let Some(first) = images.first() else {
            return Err(Error::NoImageEntries(self.path.clone()));
        };

        let extension = Utf8Path::new(first).extension().unwrap_or("jpg");
        let (mut file, cover) = CoverImage::create(extension)?;

        let mut archive = self.open()?;
        let mut entry = archive
            .by_name(first)
            .map_err(|source| Error::CorruptArchive {
                path: self.path.clone(),
                source,
            })?;
        io::copy(&mut entry, &mut file)?;

        debug!(
            "extracted cover image from '{}' to '{}'",
            self.file_name(),
            cover.path()
        );

        Ok(cover)
    }
}

/// Finds all cbz archives directly inside `folder`, naturally sorted by name.
///
/// ## Errors
///
/// Fails when the folder can't be read.
pub fn find_archives(folder: &Utf8Path) -> Result<Vec<ChapterArchive>> {
    // The folder name itself may carry glob metacharacters ("Manga [2020]"),
    // only the "*.cbz" part is a pattern.
    let pattern = format!("{}/*.cbz", Pattern::escape(folder.as_str()));
    let mut archives = Vec::new();

    for path in glob(&pattern)? {
        let path = path?;
        let Some(path) = Utf8Path::from_path(&path) else {
            error!("{path:?} is not a valid utf-8 path");
            continue;
        };
        archives.push(ChapterArchive::new(path.to_owned()));
    }

    archives.sort_by(|a, b| natural_cmp(a.file_name(), b.file_name()));

    debug!("found {} cbz archives in '{folder}'", archives.len());

    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_names_match_case_insensitively() {
        assert!(is_image_name("00001.jpg"));
        assert!(is_image_name("cover.PNG"));
        assert!(is_image_name("page.webp"));
        assert!(!is_image_name("ComicInfo.xml"));
        assert!(!is_image_name("notes.txt"));
        assert!(!is_image_name("no-extension"));
    }

    #[test]
    fn chapter_number_is_parsed_on_construction() {
        let archive = ChapterArchive::new(Utf8PathBuf::from("/x/Name Chapter 12.cbz"));
        assert_eq!(archive.number, Some(12.0));

        let archive = ChapterArchive::new(Utf8PathBuf::from("/x/Extras.cbz"));
        assert_eq!(archive.number, None);
    }
}
