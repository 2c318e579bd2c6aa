use serde::{Deserialize, Serialize};

use crate::{
    domain::{CardRegion, FilterButton, FilterPredicate, ItemId},
    error::GridErrorReport,
};

/// How the location bar was updated after a filter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentWrite {
    HistoryPush,
    DirectAssign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GridEvent {
    LayoutRequested {
        visible: Vec<ItemId>,
    },
    FilterApplied {
        filter: FilterPredicate,
    },
    SearchApplied {
        text: String,
    },
    FragmentWritten {
        fragment: String,
        via: FragmentWrite,
    },
    CardToggled {
        item_id: ItemId,
        expanded: bool,
    },
    NextPageRequested {
        loader_gif: Option<String>,
    },
    ItemsAppended {
        count: usize,
    },
    PagesExhausted {
        message: String,
    },
    LoaderFailed(GridErrorReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub item_id: ItemId,
    pub expanded: bool,
    pub title_color: String,
    pub visible_regions: Vec<CardRegion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub filter: FilterPredicate,
    pub search_text: String,
    pub visible: Vec<ItemId>,
    pub expanded: Vec<ItemId>,
    pub checked_button: Option<String>,
    pub buttons: Vec<FilterButton>,
    pub total_items: usize,
    pub page_request_in_flight: bool,
    pub pages_exhausted: bool,
}
