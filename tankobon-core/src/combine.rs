//! Merging a part's chapters (plus an optional cover) into one archive.
//!
//! Staged files get a 5-digit zero-padded ordinal prefix so the global page
//! order survives any later sort, which makes the output entry order
//! reproducible byte for byte.

use std::fs::{self, File};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, error, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::is_image_name;
use crate::errors::{Error, Result};
use crate::group::Part;
use crate::natsort::natural_cmp;

/// Combines all images of `part`, in chapter order, into a new archive at
/// `output`. The cover, when given, becomes the very first page. Chapters
/// that fail to extract are skipped; only a part with zero collected images
/// is an error, and in that case no output file is created.
///
/// Returns the number of images written.
///
/// ## Errors
///
/// Fails when the staging directory can't be created, no images are
/// collected, or the output archive can't be written.
pub fn combine(part: &Part, cover: Option<&Utf8Path>, output: &Utf8Path) -> Result<usize> {
    let staging = tempfile::tempdir()?;
    let staging_path = Utf8Path::from_path(staging.path())
        .ok_or_else(|| Error::NonUtf8Path(staging.path().to_path_buf()))?;

    debug!("collecting chapter images in staging directory '{staging_path}'");

    let staged = stage_images(part, cover, staging_path)?;

    if staged.is_empty() {
        error!("no images collected, skipping this part");
        return Err(Error::NoImages);
    }

    info!(
        "creating combined archive with {} files as '{}'",
        staged.len(),
        output.file_name().unwrap_or_default()
    );

    write_archive(&staged, output)?;

    Ok(staged.len())
}

/// Copies the cover and every chapter's images into `staging`, renamed with a
/// strictly increasing zero-padded ordinal. Returns the staged paths in order.
fn stage_images(
    part: &Part,
    cover: Option<&Utf8Path>,
    staging: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    let mut ordinal = 0usize;
    let mut staged = Vec::new();

    if let Some(cover) = cover {
        if cover.exists() {
            ordinal += 1;
            let extension = cover.extension().unwrap_or("jpg");
            let destination = staging.join(format!("{ordinal:05}_cover.{extension}"));
            match fs::copy(cover, &destination) {
                Ok(_) => {
                    debug!("inserted cover image at the start of this part");
                    staged.push(destination);
                }
                Err(err) => {
                    error!("failed to copy cover image: {err}");
                    ordinal -= 1;
                }
            }
        }
    }

    for archive in &part.archives {
        let extract_dir = staging.join(archive.file_stem());

        if let Err(err) = archive.extract_to(&extract_dir) {
            error!("failed to extract '{}': {err}", archive.file_name());
            continue;
        }

        let images = sorted_images_in_dir(&extract_dir)?;
        if images.is_empty() {
            warn!("no images found in '{}'", archive.file_name());
            continue;
        }

        for image in images {
            ordinal += 1;
            let name = image.file_name().unwrap_or_default();
            let destination = staging.join(format!("{ordinal:05}_{name}"));
            fs::copy(&image, &destination)?;
            staged.push(destination);
        }
    }

    debug!("total images collected for this part: {}", staged.len());

    Ok(staged)
}

/// Lists the image files directly inside `dir`, naturally sorted by name.
fn sorted_images_in_dir(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut images = Vec::new();

    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_image_name(path.as_str()) {
            images.push(path.to_owned());
        }
    }

    images.sort_by(|a, b| natural_cmp(a.file_name().unwrap_or(""), b.file_name().unwrap_or("")));

    Ok(images)
}

fn write_archive(staged: &[Utf8PathBuf], output: &Utf8Path) -> Result<()> {
    // Entry order is the natural order of the ordinal-prefixed names; the
    // staged list is already ordinal-ordered, the sort is belt and braces.
    let mut files = staged.to_vec();
    files.sort_by(|a, b| natural_cmp(a.file_name().unwrap_or(""), b.file_name().unwrap_or("")));

    let file = File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        writer.start_file(path.file_name().unwrap_or_default(), options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;

    Ok(())
}
