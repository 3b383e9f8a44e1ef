//! Filename parsing: chapter numbers and series names are derived from the
//! archive names alone, there is no sidecar metadata to read.

use camino::Utf8Path;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    /// Matches the numeric chapter token immediately preceding the `.cbz`
    /// extension, e.g. "Chapter 125.cbz", "Chapter125.5.cbz", "Name Chapter 12.cbz".
    static ref CHAPTER_NUMBER_REGEX: Regex =
        Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\.cbz$").unwrap();
    /// Matches "<Series Name> Chapter <number>...cbz" and captures the series name.
    static ref SERIES_NAME_REGEX: Regex =
        Regex::new(r"(?i)^(.*?)\s*chapter[\s\-_]*[0-9.]+.*\.cbz$").unwrap();
}

/// Extracts the chapter number from a cbz filename, or `None` when the name
/// carries no numeric token. Callers sort `None` as chapter 0.
pub fn parse_chapter_number(filename: &str) -> Option<f64> {
    let Some(captures) = CHAPTER_NUMBER_REGEX.captures(filename) else {
        warn!("no chapter number found in filename '{filename}'");
        return None;
    };

    captures[1].parse().ok()
}

/// Derives the series name from the naturally-first archive name when it
/// follows the "<Name> Chapter <number>" convention, falling back to the
/// folder name otherwise.
pub fn series_name(folder: &Utf8Path, first_archive_name: &str) -> String {
    if let Some(captures) = SERIES_NAME_REGEX.captures(first_archive_name) {
        let name = captures[1].trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    folder.file_name().unwrap_or(folder.as_str()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn parses_plain_chapter_numbers() {
        assert_eq!(parse_chapter_number("Chapter 125.cbz"), Some(125.0));
        assert_eq!(parse_chapter_number("Chapter125.cbz"), Some(125.0));
        assert_eq!(parse_chapter_number("Berserk Chapter 3.cbz"), Some(3.0));
    }

    #[test]
    fn parses_fractional_chapter_numbers() {
        assert_eq!(parse_chapter_number("Chapter 125.5.cbz"), Some(125.5));
        assert_eq!(parse_chapter_number("Name Chapter125.5.cbz"), Some(125.5));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(parse_chapter_number("Chapter 7.CBZ"), Some(7.0));
    }

    #[test]
    fn returns_none_without_a_numeric_token() {
        assert_eq!(parse_chapter_number("Extras.cbz"), None);
        assert_eq!(parse_chapter_number("Chapter one.cbz"), None);
    }

    #[test]
    fn series_name_comes_from_the_archive_when_it_matches() {
        let folder = Utf8PathBuf::from("/library/Some Folder");
        assert_eq!(
            series_name(&folder, "Berserk Chapter 1.cbz"),
            "Berserk".to_string()
        );
        assert_eq!(
            series_name(&folder, "One Piece chapter-1050.5.cbz"),
            "One Piece".to_string()
        );
    }

    #[test]
    fn series_name_falls_back_to_the_folder() {
        let folder = Utf8PathBuf::from("/library/Vagabond");
        assert_eq!(series_name(&folder, "001.cbz"), "Vagabond".to_string());
        // A matching pattern with an empty name also falls back.
        assert_eq!(
            series_name(&folder, "Chapter 12.cbz"),
            "Vagabond".to_string()
        );
    }
}
