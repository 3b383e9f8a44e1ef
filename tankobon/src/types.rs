use cli_table::Table;
use tankobon_core::MangaMetadata;

/// One field/details row of the metadata summary table.
#[derive(Debug, Clone, Table)]
pub struct MetadataRow {
    #[table(title = "Field")]
    field: String,
    #[table(title = "Details")]
    details: String,
}

impl MetadataRow {
    fn new(field: &str, details: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            details: details.into(),
        }
    }

    pub fn rows(metadata: &MangaMetadata) -> Vec<Self> {
        vec![
            Self::new("Title", &metadata.title),
            Self::new("Author(s)", &metadata.author),
            Self::new(
                "Score",
                metadata
                    .score
                    .map_or_else(|| "N/A".to_string(), |score| format!("{score}")),
            ),
            Self::new("Genres", &metadata.genres),
            Self::new("Synopsis", &metadata.summary),
            Self::new(
                "Cover Image",
                metadata.cover_url.clone().unwrap_or_else(|| "N/A".to_string()),
            ),
        ]
    }
}
