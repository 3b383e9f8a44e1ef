use reqwest::blocking::Client;
use serde::Deserialize;

use super::{base_url, get_json, Request};
use crate::errors::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct TitleEntry {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUrls {
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Images {
    pub jpg: Option<ImageUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub title: Option<String>,
    #[serde(default)]
    pub titles: Vec<TitleEntry>,
    #[serde(default)]
    pub title_synonyms: Vec<String>,
    pub title_english: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub score: Option<f64>,
    pub images: Option<Images>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub data: Vec<Data>,
}

/// Search for a manga by its title
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Search {
    query: String,
    limit: Option<u32>,
}

impl Search {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Request for Search {
    type Response = Response;

    fn request(self, http: &Client) -> Result<Self::Response> {
        let mut url = base_url();
        url.set_path("v4/manga");
        url.query_pairs_mut().append_pair("q", &self.query);
        if let Some(limit) = self.limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        get_json(http, url, "search")
    }
}
