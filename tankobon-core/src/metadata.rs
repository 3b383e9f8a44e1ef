//! Series metadata and the lookup collaborator boundary.
//!
//! The pipeline never talks to the network directly, it goes through a
//! [`MetadataProvider`] handle constructed by the caller. Responses are
//! validated into [`MangaMetadata`] once, at this boundary, with defaults
//! filled in for missing fields.

use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

use crate::api::search;
use crate::errors::{Error, Result};

/// Validated series metadata, read-only once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct MangaMetadata {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub genres: String,
    pub score: Option<f64>,
    pub cover_url: Option<String>,
}

impl MangaMetadata {
    pub(crate) fn from_search(data: &search::Data, matched_title: &str) -> Self {
        let title = matched_title.trim_matches('"').trim();
        let title = if title.is_empty() {
            "Unknown Title".to_string()
        } else {
            title.to_string()
        };

        let author = if data.authors.is_empty() {
            "Unknown Author".to_string()
        } else {
            data.authors
                .iter()
                .map(|author| author.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let genres = if data.genres.is_empty() {
            "No genres available.".to_string()
        } else {
            data.genres
                .iter()
                .map(|genre| genre.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let summary = data
            .synopsis
            .clone()
            .unwrap_or_else(|| "No synopsis available.".to_string());

        let cover_url = data
            .images
            .as_ref()
            .and_then(|images| images.jpg.as_ref())
            .and_then(|jpg| jpg.large_image_url.clone());

        Self {
            title,
            author,
            summary,
            genres,
            score: data.score,
            cover_url,
        }
    }
}

/// Metadata lookup collaborator injected into the pipeline.
pub trait MetadataProvider {
    /// Looks up series metadata by free-text name. `Ok(None)` means nothing
    /// matched closely enough.
    ///
    /// ## Errors
    ///
    /// Fails when the lookup backend itself fails.
    fn lookup(&self, series: &str) -> Result<Option<MangaMetadata>>;

    /// Downloads the cover image at `url` into a temporary file.
    ///
    /// ## Errors
    ///
    /// Fails on network or filesystem errors.
    fn download_cover(&self, url: &str) -> Result<CoverImage>;
}

/// A cover image living in a temporary file, deleted on [`CoverImage::cleanup`]
/// or on drop.
#[derive(Debug)]
pub struct CoverImage {
    path: Utf8PathBuf,
    temp: TempPath,
}

impl CoverImage {
    /// Creates an empty temporary file with the given extension (no dot) and
    /// hands back a writer for it together with the owning handle.
    ///
    /// ## Errors
    ///
    /// Fails when the temporary file can't be created.
    pub fn create(extension: &str) -> Result<(File, Self)> {
        let file = tempfile::Builder::new()
            .prefix("tankobon-cover-")
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let (file, temp) = file.into_parts();
        let path = Utf8PathBuf::from_path_buf(temp.to_path_buf()).map_err(Error::NonUtf8Path)?;

        Ok((file, Self { path, temp }))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Deletes the file, logging a failure instead of escalating it.
    pub fn cleanup(self) {
        let Self { path, temp } = self;
        match temp.close() {
            Ok(()) => debug!("deleted temporary cover image '{path}'"),
            Err(err) => warn!("failed to delete temporary cover image '{path}': {err}"),
        }
    }
}
