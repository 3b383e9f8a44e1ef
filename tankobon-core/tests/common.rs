//! Shared helpers for the integration tests: building little cbz archives on
//! disk and fake pipeline collaborators.

use std::cell::Cell;
use std::fs::File;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tankobon_core::{
    Converter, CoverImage, Error, MangaMetadata, MetadataProvider, Result,
};
use zip::write::FileOptions;
use zip::ZipWriter;

#[allow(dead_code)]
pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

#[allow(dead_code)]
pub fn write_cbz(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// Writes a chapter archive holding the given page names, with dummy bytes.
#[allow(dead_code)]
pub fn write_chapter(folder: &Utf8Path, name: &str, pages: &[&str]) -> Utf8PathBuf {
    let path = folder.join(name);
    let entries = pages
        .iter()
        .map(|page| (*page, b"not really an image".as_slice()))
        .collect::<Vec<_>>();
    write_cbz(&path, &entries);
    path
}

/// Entry names of an archive in central-directory (insertion) order.
#[allow(dead_code)]
pub fn entry_names(path: &Utf8Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|index| archive.by_index(index).unwrap().name().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn test_metadata() -> MangaMetadata {
    MangaMetadata {
        title: "Test Series".to_string(),
        author: "Some Author".to_string(),
        summary: "A series for testing.".to_string(),
        genres: "Action".to_string(),
        score: Some(8.5),
        cover_url: None,
    }
}

/// Metadata provider that answers from a canned record and counts lookups.
#[allow(dead_code)]
pub struct FakeProvider {
    pub metadata: Option<MangaMetadata>,
    pub only_for: Option<String>,
    pub lookups: Cell<usize>,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn found(metadata: MangaMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            only_for: None,
            lookups: Cell::new(0),
        }
    }

    /// Answers only for the given series name, misses everything else.
    pub fn found_only_for(series: &str, metadata: MangaMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            only_for: Some(series.to_string()),
            lookups: Cell::new(0),
        }
    }

    pub fn not_found() -> Self {
        Self {
            metadata: None,
            only_for: None,
            lookups: Cell::new(0),
        }
    }
}

impl MetadataProvider for FakeProvider {
    fn lookup(&self, series: &str) -> Result<Option<MangaMetadata>> {
        self.lookups.set(self.lookups.get() + 1);
        if self
            .only_for
            .as_deref()
            .is_some_and(|expected| expected != series)
        {
            return Ok(None);
        }
        Ok(self.metadata.clone())
    }

    fn download_cover(&self, _url: &str) -> Result<CoverImage> {
        let (mut file, cover) = CoverImage::create("jpg")?;
        file.write_all(b"downloaded cover bytes")?;
        Ok(cover)
    }
}

/// Converter that counts invocations and optionally fails every time.
#[allow(dead_code)]
pub struct CountingConverter {
    pub calls: Cell<usize>,
    pub fail: bool,
}

#[allow(dead_code)]
impl CountingConverter {
    pub fn working() -> Self {
        Self {
            calls: Cell::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Cell::new(0),
            fail: true,
        }
    }
}

impl Converter for CountingConverter {
    fn convert(
        &self,
        archive: &Utf8Path,
        _author: &str,
        _title: &str,
        _metadata: &MangaMetadata,
    ) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(Error::NoImages);
        }
        assert!(archive.exists(), "converter handed a missing archive");
        Ok(())
    }
}
