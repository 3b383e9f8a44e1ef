#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Core library for batching cbz chapter archives into combined "parts" and
//! converting them to e-reader format, with per-folder resumable progress.

pub use crate::api::JikanClient;
pub use crate::archive::{find_archives, ChapterArchive, IMAGE_EXTENSIONS};
pub use crate::combine::combine;
pub use crate::convert::{embed_comic_info, Converter, KccConverter};
pub use crate::errors::{Error, Result};
pub use crate::group::{group_into_parts, Part, UNKNOWN_CHAPTERS};
pub use crate::metadata::{CoverImage, MangaMetadata, MetadataProvider};
pub use crate::parse::{parse_chapter_number, series_name};
pub use crate::pipeline::{
    process_folder, process_root, PipelineEvent, PipelineOptions, Stage, StageOutcome, OUTPUT_DIR,
};
pub use crate::status::{Status, STATUS_FILE};

pub mod api;
pub mod archive;
pub mod combine;
pub mod convert;
pub mod errors;
pub mod group;
pub mod metadata;
pub mod natsort;
pub mod parse;
pub mod pipeline;
pub mod status;
