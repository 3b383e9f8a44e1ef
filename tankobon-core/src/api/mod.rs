//! Jikan (MyAnimeList) API client.

use camino::Utf8Path;
use reqwest::blocking::Client;
use reqwest::Url;
pub use search::Search;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::metadata::{CoverImage, MangaMetadata, MetadataProvider};

pub mod search;

/// How many search results to consider for fuzzy matching.
const SEARCH_LIMIT: u32 = 5;

/// Minimum normalized similarity for a search result to count as a match.
const FUZZY_MATCH_THRESHOLD: f64 = 0.85;

/// Returns the base jikan url
pub(crate) fn base_url() -> Url {
    "https://api.jikan.moe/".parse().unwrap()
}

/// Send a get request to `url` and decode the json response as `T`
pub(crate) fn get_json<T: for<'de> Deserialize<'de>>(
    http: &Client,
    url: Url,
    context: &str,
) -> Result<T> {
    http.get(url)
        .send()?
        .error_for_status()?
        .json()
        .map_err(|err| {
            error!("error decoding {context}: {err}");
            err.into()
        })
}

pub trait Request {
    type Response;

    /// ## Errors
    ///
    /// Fails on network errors or when the response can't be decoded.
    fn request(self, http: &Client) -> Result<Self::Response>;
}

/// Jikan-backed [`MetadataProvider`], owning its http client.
#[derive(Debug)]
pub struct JikanClient {
    http: Client,
}

impl JikanClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for JikanClient {
    fn lookup(&self, series: &str) -> Result<Option<MangaMetadata>> {
        let response = Search::new(series)
            .with_limit(SEARCH_LIMIT)
            .request(&self.http)?;

        if response.data.is_empty() {
            warn!("no matches found for '{series}'");
            return Ok(None);
        }

        let Some((title, data, score)) = best_match(series, &response.data) else {
            warn!("no titles to match against for '{series}'");
            return Ok(None);
        };

        if score < FUZZY_MATCH_THRESHOLD {
            warn!("no good match found for '{series}' (best: '{title}', score {score:.2})");
            return Ok(None);
        }

        info!("best match for '{series}': '{title}' (score {score:.2})");

        Ok(Some(MangaMetadata::from_search(data, title)))
    }

    fn download_cover(&self, url: &str) -> Result<CoverImage> {
        let parsed = Url::parse(url)?;
        let extension = Utf8Path::new(parsed.path())
            .extension()
            .unwrap_or("jpg")
            .to_string();

        let mut response = self.http.get(url).send()?.error_for_status()?;
        let (mut file, cover) = CoverImage::create(&extension)?;
        response.copy_to(&mut file)?;

        debug!("cover image downloaded to '{}'", cover.path());

        Ok(cover)
    }
}

/// Picks the search result whose title (any of its known titles) is closest to
/// `query`, case-insensitively.
pub(crate) fn best_match<'a>(
    query: &str,
    results: &'a [search::Data],
) -> Option<(&'a str, &'a search::Data, f64)> {
    let query = query.to_lowercase();
    let mut best: Option<(&str, &search::Data, f64)> = None;

    for data in results {
        for title in candidate_titles(data) {
            let score = strsim::normalized_levenshtein(&query, &title.to_lowercase());
            let better = match best {
                Some((_, _, best_score)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((title, data, score));
            }
        }
    }

    best
}

fn candidate_titles(data: &search::Data) -> Vec<&str> {
    let mut titles = Vec::new();

    if let Some(title) = &data.title {
        titles.push(title.as_str());
    }
    for entry in &data.titles {
        titles.push(entry.title.as_str());
    }
    for synonym in &data.title_synonyms {
        titles.push(synonym.as_str());
    }
    if let Some(english) = &data.title_english {
        titles.push(english.as_str());
    }

    titles
}
