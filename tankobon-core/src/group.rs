//! Grouping chapter archives into parts.

use std::cmp::Ordering;

use tracing::debug;

use crate::archive::ChapterArchive;

/// Label for a part whose chapter numbers can't be determined.
pub const UNKNOWN_CHAPTERS: &str = "Unknown Chapters";

/// A contiguous run of chapters combined into one output archive.
#[derive(Debug, Clone)]
pub struct Part {
    pub archives: Vec<ChapterArchive>,
}

impl Part {
    /// The `"<min> - <max>"` chapter range label, the join key between the
    /// pipeline stages and the status file. Chapter numbers are floor-truncated,
    /// unparsable ones count as 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn chapter_range(&self) -> String {
        let numbers = self
            .archives
            .iter()
            .map(|archive| archive.number.unwrap_or(0.0));

        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for number in numbers {
            min = min.min(number);
            max = max.max(number);
        }

        if min > max {
            // Empty part, shouldn't happen when built by `group_into_parts`.
            return UNKNOWN_CHAPTERS.to_string();
        }

        format!("{} - {}", min.trunc() as i64, max.trunc() as i64)
    }
}

/// Sorts archives by parsed chapter number (unparsable first, as chapter 0)
/// and partitions them into consecutive runs of at most `chapters_per_part`.
/// The sort is stable, ties keep their natural filename order.
#[must_use]
pub fn group_into_parts(mut archives: Vec<ChapterArchive>, chapters_per_part: usize) -> Vec<Part> {
    let chapters_per_part = chapters_per_part.max(1);

    archives.sort_by(|a, b| {
        a.number
            .unwrap_or(0.0)
            .partial_cmp(&b.number.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });

    let mut parts = Vec::new();
    let mut iter = archives.into_iter().peekable();
    while iter.peek().is_some() {
        let archives = iter.by_ref().take(chapters_per_part).collect();
        parts.push(Part { archives });
    }

    debug!(
        "organized archives into {} parts with up to {chapters_per_part} chapters each",
        parts.len()
    );

    parts
}
