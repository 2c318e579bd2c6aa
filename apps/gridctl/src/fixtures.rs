//! JSON-backed collaborators for driving a grid from the command line.

use std::{
    collections::{BTreeSet, VecDeque},
    path::Path,
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use grid_core::{ItemLoader, LayoutEngine, Location, Viewport};
use serde::Deserialize;
use shared::{
    domain::{FilterButton, Item, TagSlug},
    options::GridOptions,
};
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub buttons: Vec<FilterButton>,
    pub items: Vec<Item>,
    /// Pages served after the first one, in order.
    #[serde(default)]
    pub pages: Vec<Vec<Item>>,
}

impl Fixtures {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("fixtures must be a JSON object with an `items` array")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read fixtures '{}'", path.display()))?;
        Self::parse(&raw)
    }

    /// Explicit buttons, or one per tag found on the first page.
    pub fn filter_buttons(&self) -> Vec<FilterButton> {
        if !self.buttons.is_empty() {
            return self.buttons.clone();
        }
        self.items
            .iter()
            .flat_map(|item| item.tags.iter().cloned())
            .collect::<BTreeSet<TagSlug>>()
            .into_iter()
            .map(|tag| FilterButton::for_tag(tag.to_string(), tag))
            .collect()
    }
}

/// Serves the fixture pages one at a time; page numbers start at 2 since the
/// first page is rendered with the grid.
pub struct FixturePageLoader {
    options: GridOptions,
    pages: Mutex<VecDeque<Vec<Item>>>,
    next_page: AtomicU32,
}

impl FixturePageLoader {
    pub fn new(options: GridOptions, pages: Vec<Vec<Item>>) -> Self {
        Self {
            options,
            pages: Mutex::new(pages.into()),
            next_page: AtomicU32::new(2),
        }
    }
}

#[async_trait]
impl ItemLoader for FixturePageLoader {
    async fn request_next_page(&self) -> Result<Vec<Item>> {
        let page_number = self.next_page.fetch_add(1, Ordering::SeqCst);
        let page_url = self.options.page_url_for(page_number)?;
        let page = self
            .pages
            .lock()
            .map_err(|_| anyhow!("fixture page queue poisoned"))?
            .pop_front()
            .unwrap_or_default();
        info!(%page_url, items = page.len(), "serving fixture page");
        Ok(page)
    }
}

/// Uniform rows of `columns` cards; enough to drive the "need more items" check.
pub struct RowLayout {
    columns: u32,
    row_height: u32,
    height: AtomicU32,
}

impl RowLayout {
    pub fn new(columns: u32, row_height: u32) -> Self {
        Self {
            columns: columns.max(1),
            row_height,
            height: AtomicU32::new(0),
        }
    }
}

impl LayoutEngine for RowLayout {
    fn arrange(&self, items: &[Item], filter: &dyn Fn(&Item) -> bool) {
        let shown = u32::try_from(items.iter().filter(|&item| filter(item)).count())
            .unwrap_or(u32::MAX);
        let rows = shown.div_ceil(self.columns);
        let height = rows.saturating_mul(self.row_height);
        self.height.store(height, Ordering::SeqCst);
        debug!(shown, rows, height, "arranged grid");
    }

    fn container_height(&self) -> u32 {
        self.height.load(Ordering::SeqCst)
    }
}

/// Location bar backed by the page URL; only the fragment ever changes.
pub struct UrlLocation {
    url: Mutex<Url>,
    history: bool,
}

impl UrlLocation {
    pub fn new(page_url: &str, history: bool) -> Result<Self> {
        let url = Url::parse(page_url).with_context(|| format!("invalid page url '{page_url}'"))?;
        Ok(Self {
            url: Mutex::new(url),
            history,
        })
    }

    pub fn current(&self) -> String {
        self.url
            .lock()
            .map(|url| url.to_string())
            .unwrap_or_default()
    }

    fn set_fragment(&self, fragment: &str) {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if let Ok(mut url) = self.url.lock() {
            url.set_fragment(Some(fragment));
            info!(url = %url, "location updated");
        }
    }
}

impl Location for UrlLocation {
    fn supports_history(&self) -> bool {
        self.history
    }

    fn push_history(&self, fragment: &str) {
        self.set_fragment(fragment);
    }

    fn assign_fragment(&self, fragment: &str) {
        self.set_fragment(fragment);
    }
}

pub struct FixedViewport(pub u32);

impl Viewport for FixedViewport {
    fn height(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
#[path = "tests/fixtures_tests.rs"]
mod tests;
