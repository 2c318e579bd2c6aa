use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{FilterPredicate, Item, ItemId},
    error::{GridError, GridErrorReport},
    options::GridOptions,
    protocol::{CardView, FragmentWrite, GridEvent, GridSnapshot},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod cards;
pub mod debounce;
pub mod filter_bar;
pub mod search;

pub use cards::CardState;
pub use debounce::Debouncer;
pub use filter_bar::FilterBar;
pub use search::SearchPattern;

/// Arranges items into the packed grid. Called on every visibility or size change.
pub trait LayoutEngine: Send + Sync {
    /// Packs the items accepted by `filter`; hidden items are skipped.
    fn arrange(&self, items: &[Item], filter: &dyn Fn(&Item) -> bool);
    /// Rendered height of the item container after the last `arrange`.
    fn container_height(&self) -> u32;
}

pub struct MissingLayoutEngine;

impl LayoutEngine for MissingLayoutEngine {
    fn arrange(&self, _items: &[Item], _filter: &dyn Fn(&Item) -> bool) {}

    fn container_height(&self) -> u32 {
        0
    }
}

/// Paged item source. An empty page means there is nothing left to load.
#[async_trait]
pub trait ItemLoader: Send + Sync {
    async fn request_next_page(&self) -> Result<Vec<Item>>;
}

pub struct MissingItemLoader;

#[async_trait]
impl ItemLoader for MissingItemLoader {
    async fn request_next_page(&self) -> Result<Vec<Item>> {
        Err(anyhow!("item loader unavailable"))
    }
}

/// Location bar of the hosting page. Writes must never trigger navigation.
pub trait Location: Send + Sync {
    fn supports_history(&self) -> bool;
    fn push_history(&self, fragment: &str);
    fn assign_fragment(&self, fragment: &str);
}

pub struct MissingLocation;

impl Location for MissingLocation {
    fn supports_history(&self) -> bool {
        true
    }

    fn push_history(&self, _fragment: &str) {}

    fn assign_fragment(&self, _fragment: &str) {}
}

pub trait Viewport: Send + Sync {
    fn height(&self) -> u32;
}

pub struct MissingViewport;

impl Viewport for MissingViewport {
    fn height(&self) -> u32 {
        0
    }
}

pub struct GridDependencies {
    pub layout: Arc<dyn LayoutEngine>,
    pub loader: Arc<dyn ItemLoader>,
    pub location: Arc<dyn Location>,
    pub viewport: Arc<dyn Viewport>,
}

impl Default for GridDependencies {
    fn default() -> Self {
        Self {
            layout: Arc::new(MissingLayoutEngine),
            loader: Arc::new(MissingItemLoader),
            location: Arc::new(MissingLocation),
            viewport: Arc::new(MissingViewport),
        }
    }
}

/// Items accepted by both the tag filter and the search pattern, in collection order.
pub fn visible_set(
    items: &[Item],
    filter: &FilterPredicate,
    pattern: &SearchPattern,
) -> Vec<ItemId> {
    items
        .iter()
        .filter(|item| filter.matches(item) && pattern.matches(item))
        .map(|item| item.id)
        .collect()
}

/// Coordinates filter buttons, quick-search and card toggles for one grid.
pub struct GridCoordinator {
    options: GridOptions,
    layout: Arc<dyn LayoutEngine>,
    loader: Arc<dyn ItemLoader>,
    location: Arc<dyn Location>,
    viewport: Arc<dyn Viewport>,
    search_debounce: Debouncer,
    inner: Mutex<GridState>,
    events: broadcast::Sender<GridEvent>,
}

struct GridState {
    items: Vec<Item>,
    cards: HashMap<ItemId, CardState>,
    filter: FilterPredicate,
    pattern: SearchPattern,
    live_search_text: String,
    visible: Vec<ItemId>,
    filter_bar: FilterBar,
    page_request_in_flight: bool,
    pages_exhausted: bool,
}

impl GridState {
    fn new(items: Vec<Item>, filter_bar: FilterBar) -> Self {
        let mut state = Self {
            items: Vec::with_capacity(items.len()),
            cards: HashMap::new(),
            filter: FilterPredicate::All,
            pattern: SearchPattern::MatchAll,
            live_search_text: String::new(),
            visible: Vec::new(),
            filter_bar,
            page_request_in_flight: false,
            pages_exhausted: false,
        };
        state.append(items);
        state.visible = visible_set(&state.items, &state.filter, &state.pattern);
        state
    }

    /// Adds items not already present; returns how many were new.
    fn append(&mut self, items: Vec<Item>) -> usize {
        let mut added = 0;
        for item in items {
            if self.cards.contains_key(&item.id) {
                debug!(item_id = %item.id, "skipping duplicate item");
                continue;
            }
            self.cards
                .insert(item.id, CardState::new(item.title_color.clone()));
            self.items.push(item);
            added += 1;
        }
        added
    }
}

impl GridCoordinator {
    pub fn new(options: GridOptions, items: Vec<Item>) -> Arc<Self> {
        Self::new_with_dependencies(
            options,
            items,
            FilterBar::default(),
            GridDependencies::default(),
        )
    }

    pub fn new_with_dependencies(
        options: GridOptions,
        items: Vec<Item>,
        filter_bar: FilterBar,
        dependencies: GridDependencies,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let search_debounce = Debouncer::new(options.search_debounce());
        Arc::new(Self {
            options,
            layout: dependencies.layout,
            loader: dependencies.loader,
            location: dependencies.location,
            viewport: dependencies.viewport,
            search_debounce,
            inner: Mutex::new(GridState::new(items, filter_bar)),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GridEvent> {
        self.events.subscribe()
    }

    /// Seeds the filter from the URL fragment and the pattern from the preset
    /// search value, lays out, then checks whether more items are needed.
    pub async fn initialize(
        self: &Arc<Self>,
        url_fragment: &str,
        preset_search: Option<&str>,
    ) -> Vec<ItemId> {
        let filter = FilterPredicate::from_fragment(url_fragment);
        let preset = preset_search.unwrap_or_default();
        let (visible, needs_page) = {
            let mut state = self.inner.lock().await;
            state.filter_bar.select(&filter);
            state.filter = filter;
            state.pattern = SearchPattern::compile(preset);
            info!(
                filter = %state.filter,
                search = preset,
                "initializing grid"
            );
            let visible = self.refresh(&mut state);
            (visible, self.claim_page_request(&mut state))
        };
        if needs_page {
            self.start_page_request();
        }
        visible
    }

    /// Replaces the active filter. The pattern is rebuilt from the live search
    /// box so a running search keeps applying under the new filter.
    pub async fn apply_filter(self: &Arc<Self>, filter: FilterPredicate) -> Vec<ItemId> {
        let (visible, needs_page) = {
            let mut state = self.inner.lock().await;
            state.pattern = SearchPattern::compile(&state.live_search_text);
            state.filter_bar.select(&filter);
            state.filter = filter.clone();
            self.write_fragment(&filter);
            let _ = self.events.send(GridEvent::FilterApplied { filter });
            let visible = self.refresh(&mut state);
            (visible, self.claim_page_request(&mut state))
        };
        if needs_page {
            self.start_page_request();
        }
        visible
    }

    /// Clicks the filter button at `index`; `None` when there is no such button.
    pub async fn press_filter_button(self: &Arc<Self>, index: usize) -> Option<Vec<ItemId>> {
        let filter = {
            let state = self.inner.lock().await;
            state.filter_bar.button(index)?.filter.clone()
        };
        Some(self.apply_filter(filter).await)
    }

    /// Records a keystroke in the live search box. The pattern is rebuilt once
    /// the box has been quiet for the debounce window.
    pub async fn apply_search(self: &Arc<Self>, raw_text: impl Into<String>) {
        let raw_text = raw_text.into();
        debug!(text = %raw_text, "search input changed");
        self.inner.lock().await.live_search_text = raw_text;

        let coordinator = Arc::clone(self);
        self.search_debounce.schedule(async move {
            coordinator.run_search().await;
        });
    }

    /// Runs a pending debounced search right away. Returns whether one was pending.
    pub async fn flush_search(self: &Arc<Self>) -> bool {
        if !self.search_debounce.cancel() {
            return false;
        }
        self.run_search().await;
        true
    }

    pub fn search_pending(&self) -> bool {
        self.search_debounce.is_pending()
    }

    async fn run_search(self: &Arc<Self>) {
        let needs_page = {
            let mut state = self.inner.lock().await;
            let text = state.live_search_text.clone();
            state.pattern = SearchPattern::compile(&text);
            let _ = self.events.send(GridEvent::SearchApplied { text });
            self.refresh(&mut state);
            self.claim_page_request(&mut state)
        };
        if needs_page {
            self.start_page_request();
        }
    }

    /// Expands or collapses one card and lays the grid out again.
    pub async fn toggle_expand(&self, item_id: ItemId) -> Result<CardView, GridError> {
        let mut state = self.inner.lock().await;
        let view = {
            let card = state
                .cards
                .get_mut(&item_id)
                .ok_or(GridError::UnknownItem(item_id))?;
            card.toggle(&self.options.emphasized_title_color);
            card.view(item_id)
        };
        debug!(%item_id, expanded = view.expanded, "card toggled");
        let _ = self.events.send(GridEvent::CardToggled {
            item_id,
            expanded: view.expanded,
        });
        self.refresh(&mut state);
        Ok(view)
    }

    pub async fn card_view(&self, item_id: ItemId) -> Option<CardView> {
        let state = self.inner.lock().await;
        state.cards.get(&item_id).map(|card| card.view(item_id))
    }

    /// Lays out the current visible set again, e.g. after a resize or once
    /// images have finished loading.
    pub async fn relayout(&self) -> Vec<ItemId> {
        let mut state = self.inner.lock().await;
        self.refresh(&mut state)
    }

    /// Requests the next page when nothing is visible or the container is
    /// shorter than the viewport. Returns whether a request was issued.
    pub async fn ensure_enough_items(self: &Arc<Self>) -> bool {
        let needs_page = {
            let mut state = self.inner.lock().await;
            self.claim_page_request(&mut state)
        };
        if needs_page {
            self.start_page_request();
        }
        needs_page
    }

    /// Marks a page request in flight if the grid is short of items. At most
    /// one request is in flight at a time.
    fn claim_page_request(&self, state: &mut GridState) -> bool {
        if !self.options.paginate || state.pages_exhausted || state.page_request_in_flight {
            return false;
        }

        let container_height = self.layout.container_height();
        let viewport_height = self.viewport.height();
        if !state.visible.is_empty() && container_height >= viewport_height {
            return false;
        }

        debug!(
            visible = state.visible.len(),
            container_height, viewport_height, "grid needs more items"
        );
        state.page_request_in_flight = true;
        true
    }

    fn start_page_request(self: &Arc<Self>) {
        let _ = self.events.send(GridEvent::NextPageRequested {
            loader_gif: self.options.loader_gif.clone(),
        });
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let page = coordinator.loader.request_next_page().await;
            coordinator.finish_page_request(page).await;
        });
    }

    async fn finish_page_request(self: &Arc<Self>, page: Result<Vec<Item>>) {
        let mut state = self.inner.lock().await;
        state.page_request_in_flight = false;

        match page {
            Ok(items) if items.is_empty() => {
                state.pages_exhausted = true;
                info!("item loader has no more pages");
                let _ = self.events.send(GridEvent::PagesExhausted {
                    message: self.options.finished_message.clone(),
                });
            }
            Ok(items) => {
                let count = state.append(items);
                info!(count, total = state.items.len(), "appended loaded items");
                let _ = self.events.send(GridEvent::ItemsAppended { count });
                self.refresh(&mut state);
                if self.claim_page_request(&mut state) {
                    drop(state);
                    self.start_page_request();
                }
            }
            Err(err) => {
                let err = GridError::Loader(err.to_string());
                warn!(%err, "page request failed");
                let _ = self
                    .events
                    .send(GridEvent::LoaderFailed(GridErrorReport::from(&err)));
            }
        }
    }

    pub async fn visible_items(&self) -> Vec<ItemId> {
        self.inner.lock().await.visible.clone()
    }

    pub async fn snapshot(&self) -> GridSnapshot {
        let state = self.inner.lock().await;
        let mut expanded = state
            .cards
            .iter()
            .filter(|(_, card)| card.is_expanded())
            .map(|(item_id, _)| *item_id)
            .collect::<Vec<_>>();
        expanded.sort();

        GridSnapshot {
            filter: state.filter.clone(),
            search_text: state.pattern.source().to_string(),
            visible: state.visible.clone(),
            expanded,
            checked_button: state.filter_bar.checked().map(|button| button.label.clone()),
            buttons: state.filter_bar.buttons().to_vec(),
            total_items: state.items.len(),
            page_request_in_flight: state.page_request_in_flight,
            pages_exhausted: state.pages_exhausted,
        }
    }

    /// Recomputes the visible set and hands the same predicate to the layout engine.
    fn refresh(&self, state: &mut GridState) -> Vec<ItemId> {
        let filter = &state.filter;
        let pattern = &state.pattern;
        let accepts = |item: &Item| filter.matches(item) && pattern.matches(item);

        let visible = visible_set(&state.items, filter, pattern);
        self.layout.arrange(&state.items, &accepts);
        state.visible = visible.clone();

        debug!(
            filter = %state.filter,
            search = state.pattern.source(),
            visible = visible.len(),
            "layout requested"
        );
        let _ = self.events.send(GridEvent::LayoutRequested {
            visible: visible.clone(),
        });
        visible
    }

    fn write_fragment(&self, filter: &FilterPredicate) {
        let fragment = filter.to_fragment();
        let via = if self.location.supports_history() {
            self.location.push_history(&format!("#{fragment}"));
            FragmentWrite::HistoryPush
        } else {
            self.location.assign_fragment(&fragment);
            FragmentWrite::DirectAssign
        };
        let _ = self.events.send(GridEvent::FragmentWritten { fragment, via });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
