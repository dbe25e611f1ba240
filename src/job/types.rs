// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;
use uuid::Uuid;

use crate::types::PipelineError;

pub const DEFAULT_JOB_NAME: &str = "Generated PDF";
pub const DEFAULT_MARGIN: &str = "20px";

/// Paper formats understood by the rendering backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    Letter,
    Legal,
    Tabloid,
    Ledger,
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
}

impl PageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
            PageSize::Tabloid => "Tabloid",
            PageSize::Ledger => "Ledger",
            PageSize::A0 => "A0",
            PageSize::A1 => "A1",
            PageSize::A2 => "A2",
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::A6 => "A6",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSize {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = match s.trim().to_ascii_lowercase().as_str() {
            "letter" => PageSize::Letter,
            "legal" => PageSize::Legal,
            "tabloid" => PageSize::Tabloid,
            "ledger" => PageSize::Ledger,
            "a0" => PageSize::A0,
            "a1" => PageSize::A1,
            "a2" => PageSize::A2,
            "a3" => PageSize::A3,
            "a4" => PageSize::A4,
            "a5" => PageSize::A5,
            "a6" => PageSize::A6,
            _ => {
                return Err(PipelineError::InvalidJob(format!(
                    "Invalid page size: {}",
                    s
                )))
            }
        };
        Ok(size)
    }
}

/// CSS lengths for each side of the printed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: DEFAULT_MARGIN.to_string(),
            right: DEFAULT_MARGIN.to_string(),
            bottom: DEFAULT_MARGIN.to_string(),
            left: DEFAULT_MARGIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub page_size: PageSize,
    pub landscape: bool,
    pub sections_to_remove: Vec<String>,
    pub margins: Margins,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    /// Keeps only selectors that can be embedded in a style rule and a script
    pub fn with_sections_to_remove<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sections_to_remove = selectors
            .into_iter()
            .filter_map(|s| sanitize_selector(s.as_ref()))
            .collect();
        self
    }
}

fn sanitize_selector(selector: &str) -> Option<String> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }
    if selector.contains(['{', '}', ';', '<']) {
        warn!("Ignoring unsafe selector={:?}", selector);
        return None;
    }
    Some(selector.to_string())
}

/// One request to turn a set of pages into a single PDF. Lives for one HTTP request.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub name: String,
    pub urls: Vec<Url>,
    pub options: RenderOptions,
}

impl Job {
    pub fn new(name: &str, urls: Vec<Url>, options: RenderOptions) -> Self {
        let name = name.trim();
        Self {
            id: Uuid::new_v4(),
            name: if name.is_empty() {
                DEFAULT_JOB_NAME.to_string()
            } else {
                name.to_string()
            },
            urls,
            options,
        }
    }

    /// Builds a job from user input, dropping anything that is not an absolute http(s) URL.
    pub fn from_raw<I, S>(
        name: Option<&str>,
        raw_urls: I,
        options: RenderOptions,
    ) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<Url> = raw_urls
            .into_iter()
            .filter_map(|raw| parse_page_url(raw.as_ref()))
            .collect();
        if urls.is_empty() {
            return Err(PipelineError::InvalidJob(
                "No valid URLs provided".to_string(),
            ));
        }
        Ok(Self::new(name.unwrap_or(DEFAULT_JOB_NAME), urls, options))
    }
}

fn parse_page_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Some(url),
        Ok(url) => {
            warn!("Ignoring url={} with scheme={}", raw, url.scheme());
            None
        }
        Err(e) => {
            warn!("Ignoring invalid url={:?}: {}", raw, e);
            None
        }
    }
}

/// Splits a comma separated query value, trimming and dropping empty items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
