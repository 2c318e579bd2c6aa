use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GridError;

pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 200;
pub const DEFAULT_EMPHASIZED_TITLE_COLOR: &str = "#222";

/// Per-grid settings handed to the page by the server-side renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub paginate: bool,
    pub finished_message: String,
    /// Indicator shown while a page request is in flight.
    pub loader_gif: Option<String>,
    pub page_url: String,
    pub is_home: bool,
    pub search_debounce_ms: u64,
    pub emphasized_title_color: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            paginate: false,
            finished_message: "No more posts to load.".into(),
            loader_gif: None,
            page_url: "http://localhost/".into(),
            is_home: false,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            emphasized_title_color: DEFAULT_EMPHASIZED_TITLE_COLOR.into(),
        }
    }
}

impl GridOptions {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        self.base_url()?;
        if self.emphasized_title_color.trim().is_empty() {
            return Err(GridError::InvalidOption {
                field: "emphasized_title_color",
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// URL of page `page_number`: `{page_url}page/{n}/` on the home page,
    /// `{page_url}{n}/` everywhere else.
    pub fn page_url_for(&self, page_number: u32) -> Result<Url, GridError> {
        let base = self.base_url()?;
        let relative = if self.is_home {
            format!("page/{page_number}/")
        } else {
            format!("{page_number}/")
        };
        base.join(&relative).map_err(|err| GridError::InvalidOption {
            field: "page_url",
            message: err.to_string(),
        })
    }

    fn base_url(&self) -> Result<Url, GridError> {
        let raw = self.page_url.trim();
        let raw = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        Url::parse(&raw).map_err(|err| GridError::InvalidOption {
            field: "page_url",
            message: format!("{raw}: {err}"),
        })
    }
}

/// Accepts the renderer's `yes`/`no` flags as well as plain booleans.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Some(true),
        "no" | "false" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_uses_page_segment_on_home() {
        let options = GridOptions {
            page_url: "https://example.com/".into(),
            is_home: true,
            ..GridOptions::default()
        };
        assert_eq!(
            options.page_url_for(2).expect("url").as_str(),
            "https://example.com/page/2/"
        );
    }

    #[test]
    fn page_url_appends_number_off_home() {
        let options = GridOptions {
            page_url: "https://example.com/faq".into(),
            ..GridOptions::default()
        };
        assert_eq!(
            options.page_url_for(3).expect("url").as_str(),
            "https://example.com/faq/3/"
        );
    }

    #[test]
    fn rejects_unparseable_page_url() {
        let options = GridOptions {
            page_url: "not a url".into(),
            ..GridOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn parses_renderer_flags() {
        assert_eq!(parse_flag("yes"), Some(true));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
