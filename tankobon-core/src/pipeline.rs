//! The per-folder pipeline: group chapters into parts, combine each part,
//! convert it, and record completion after every stage.
//!
//! Every stage transition is gated by the status record, so re-running the
//! pipeline on an unchanged folder performs no work. Progress is reported
//! through [`PipelineEvent`]s handed to a caller-supplied sink, which keeps
//! rendering concerns (progress bars, tables) out of this crate.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{error, info, warn};

use crate::archive::{find_archives, ChapterArchive};
use crate::combine::combine;
use crate::convert::Converter;
use crate::errors::{Error, Result};
use crate::group::{group_into_parts, Part};
use crate::metadata::{CoverImage, MangaMetadata, MetadataProvider};
use crate::parse::series_name;
use crate::status::Status;

/// Name of the output directory created inside each processed folder.
pub const OUTPUT_DIR: &str = "Converted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Combine,
    Convert,
}

/// Outcome of one stage for one part. `AlreadyDone` is a harmless skip and
/// must never be conflated with `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    AlreadyDone,
    Failed(String),
}

/// Progress notifications emitted while a folder is processed.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    FolderStarted {
        folder: Utf8PathBuf,
        series: String,
        metadata: MangaMetadata,
        parts: usize,
    },
    PartStarted {
        index: usize,
        total: usize,
        range: String,
        chapters: usize,
    },
    StageFinished {
        range: String,
        stage: Stage,
        outcome: StageOutcome,
    },
    PartFinished {
        index: usize,
    },
    FolderFinished {
        folder: Utf8PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chapters_per_part: usize,
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chapters_per_part: 10,
            dry_run: false,
        }
    }
}

/// Processes one folder of chapter archives end to end.
///
/// Part-level failures are reported through events and logged, they don't
/// abort the remaining parts.
///
/// ## Errors
///
/// Fails when the folder holds no archives, metadata can't be obtained, or
/// the output directory can't be created.
pub fn process_folder(
    folder: &Utf8Path,
    options: &PipelineOptions,
    provider: &dyn MetadataProvider,
    converter: &dyn Converter,
    events: &mut dyn FnMut(PipelineEvent),
) -> Result<()> {
    info!("scanning directory: {folder}");

    let archives = find_archives(folder)?;
    if archives.is_empty() {
        return Err(Error::NoArchives(folder.to_owned()));
    }

    let series = series_name(folder, archives[0].file_name());
    info!("fetching metadata for '{series}'");
    let metadata = provider
        .lookup(&series)?
        .ok_or_else(|| Error::MetadataNotFound(series.clone()))?;

    let cover = if options.dry_run {
        None
    } else {
        obtain_cover(provider, &metadata, &archives)
    };

    let parts = group_into_parts(archives, options.chapters_per_part);
    let total = parts.len();

    events(PipelineEvent::FolderStarted {
        folder: folder.to_owned(),
        series: series.clone(),
        metadata: metadata.clone(),
        parts: total,
    });

    let output_dir = folder.join(OUTPUT_DIR);
    if !options.dry_run {
        fs::create_dir_all(&output_dir)?;
    }

    let mut status = Status::load(folder);

    for (index, part) in parts.iter().enumerate() {
        let index = index + 1;
        let range = part.chapter_range();

        info!(
            "processing part {index}/{total} with {} chapters (range {range})",
            part.archives.len()
        );

        events(PipelineEvent::PartStarted {
            index,
            total,
            range: range.clone(),
            chapters: part.archives.len(),
        });

        if options.dry_run {
            if status.is_combined(&range) {
                info!("[dry run] chapters {range} already combined, would skip combining");
            }
            if status.is_converted(&range) {
                info!("[dry run] chapters {range} already converted, would skip conversion");
            }
            info!("[dry run] would process chapters {range}");
            events(PipelineEvent::PartFinished { index });
            continue;
        }

        let output_name = sanitize_filename::sanitize(format!("{series} {range}.cbz"));
        let output_path = output_dir.join(output_name);

        let outcome = combine_stage(part, &range, cover.as_ref(), &output_path, &mut status);
        let combine_failed = matches!(outcome, StageOutcome::Failed(_));
        events(PipelineEvent::StageFinished {
            range: range.clone(),
            stage: Stage::Combine,
            outcome,
        });

        if !combine_failed {
            let outcome = convert_stage(
                converter,
                &output_path,
                &series,
                &range,
                &metadata,
                &mut status,
            );
            events(PipelineEvent::StageFinished {
                range: range.clone(),
                stage: Stage::Convert,
                outcome,
            });
        }

        events(PipelineEvent::PartFinished { index });
    }

    if let Some(cover) = cover {
        cover.cleanup();
    }

    events(PipelineEvent::FolderFinished {
        folder: folder.to_owned(),
    });

    info!("all parts of '{series}' have been processed");

    Ok(())
}

/// Processes every child directory of `root` that contains cbz archives.
///
/// Folder-level failures are logged and don't stop the batch.
///
/// ## Errors
///
/// Fails only when `root` itself can't be read.
pub fn process_root(
    root: &Utf8Path,
    options: &PipelineOptions,
    provider: &dyn MetadataProvider,
    converter: &dyn Converter,
    events: &mut dyn FnMut(PipelineEvent),
) -> Result<()> {
    info!("processing all folders in '{root}'");

    let mut folders = Vec::new();
    for entry in root.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.push(entry.path().to_owned());
        }
    }
    folders.sort();

    for folder in folders {
        let has_archives = !find_archives(&folder)?.is_empty();
        if !has_archives {
            info!("skipping folder (no cbz archives found): {folder}");
            continue;
        }

        if let Err(err) = process_folder(&folder, options, provider, converter, events) {
            error!("failed to process '{folder}': {err}");
        }
    }

    Ok(())
}

fn combine_stage(
    part: &Part,
    range: &str,
    cover: Option<&CoverImage>,
    output_path: &Utf8Path,
    status: &mut Status,
) -> StageOutcome {
    if status.is_combined(range) {
        if output_path.exists() {
            info!("chapters {range} already combined, skipping");
            return StageOutcome::AlreadyDone;
        }
        // The status says combined but the archive is gone; trusting the mark
        // would hand a missing file to the converter.
        warn!("chapters {range} marked combined but '{output_path}' is missing, re-combining");
    }

    match combine(part, cover.map(CoverImage::path), output_path) {
        Ok(count) => {
            info!("combined {count} images for chapters {range}");
            if let Err(err) = status.mark_combined(range) {
                warn!("failed to record combined status for {range}: {err}");
            }
            StageOutcome::Completed
        }
        Err(err) => {
            error!("failed to combine chapters {range}: {err}");
            StageOutcome::Failed(err.to_string())
        }
    }
}

fn convert_stage(
    converter: &dyn Converter,
    archive: &Utf8Path,
    series: &str,
    range: &str,
    metadata: &MangaMetadata,
    status: &mut Status,
) -> StageOutcome {
    if status.is_converted(range) {
        info!("chapters {range} already converted, skipping");
        return StageOutcome::AlreadyDone;
    }

    let title = format!("{series} {range}");

    match converter.convert(archive, &metadata.author, &title, metadata) {
        Ok(()) => {
            if let Err(err) = status.mark_converted(range) {
                warn!("failed to record converted status for {range}: {err}");
            }
            StageOutcome::Completed
        }
        Err(err) => {
            error!("failed to convert chapters {range}: {err}");
            StageOutcome::Failed(err.to_string())
        }
    }
}

fn obtain_cover(
    provider: &dyn MetadataProvider,
    metadata: &MangaMetadata,
    archives: &[ChapterArchive],
) -> Option<CoverImage> {
    if let Some(url) = &metadata.cover_url {
        match provider.download_cover(url) {
            Ok(cover) => return Some(cover),
            Err(err) => warn!("failed to download cover image: {err}"),
        }
    }

    // Fall back to the first page of the first chapter.
    match archives[0].extract_first_image() {
        Ok(cover) => Some(cover),
        Err(err) => {
            warn!("failed to extract a fallback cover image: {err}");
            None
        }
    }
}
