use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ItemId);

/// Taxonomy term slug as it appears in item class lists and filter buttons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSlug(String);

impl TagSlug {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagSlug {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Full card text; quick-search matches against this.
    pub text: String,
    #[serde(default)]
    pub tags: BTreeSet<TagSlug>,
    #[serde(default = "default_title_color")]
    pub title_color: String,
}

fn default_title_color() -> String {
    "inherit".to_string()
}

impl Item {
    pub fn new(id: i64, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            title: title.into(),
            text: text.into(),
            tags: BTreeSet::new(),
            title_color: default_title_color(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagSlug>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_title_color(mut self, color: impl Into<String>) -> Self {
        self.title_color = color.into();
        self
    }

    pub fn has_tag(&self, tag: &TagSlug) -> bool {
        self.tags.contains(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tag", rename_all = "snake_case")]
pub enum FilterPredicate {
    #[default]
    All,
    Tag(TagSlug),
}

impl FilterPredicate {
    /// Parses a filter button's `data-filter` value: `*`, `all`, `.slug` or `slug`.
    pub fn from_filter_attr(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" || raw.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        let slug = raw.strip_prefix('.').unwrap_or(raw);
        if slug.is_empty() {
            Self::All
        } else {
            Self::Tag(TagSlug::new(slug))
        }
    }

    /// Parses a URL fragment, with or without the leading `#`.
    pub fn from_fragment(fragment: &str) -> Self {
        let fragment = fragment.trim();
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        Self::from_filter_attr(fragment)
    }

    /// Fragment written back to the location bar; empty for `All`.
    pub fn to_fragment(&self) -> String {
        match self {
            Self::All => String::new(),
            Self::Tag(tag) => tag.as_str().to_string(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => item.has_tag(tag),
        }
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Tag(tag) => write!(f, ".{tag}"),
        }
    }
}

/// Auxiliary card regions revealed while a card is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardRegion {
    Answer,
    Comments,
    Rating,
    Share,
}

impl CardRegion {
    pub const ALL: [CardRegion; 4] = [
        CardRegion::Answer,
        CardRegion::Comments,
        CardRegion::Rating,
        CardRegion::Share,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterButton {
    pub label: String,
    pub filter: FilterPredicate,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

impl FilterButton {
    pub fn see_all() -> Self {
        Self {
            label: "See All".to_string(),
            filter: FilterPredicate::All,
            background: None,
            text_color: None,
        }
    }

    pub fn for_tag(label: impl Into<String>, tag: impl Into<TagSlug>) -> Self {
        Self {
            label: label.into(),
            filter: FilterPredicate::Tag(tag.into()),
            background: None,
            text_color: None,
        }
    }
}
