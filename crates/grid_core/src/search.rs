//! Quick-search pattern compiled from the live or preset search box.

use regex::{Regex, RegexBuilder};
use shared::domain::Item;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub enum SearchPattern {
    #[default]
    MatchAll,
    Regex { source: String, regex: Regex },
    /// Text that does not compile as a pattern; matched as a case-insensitive substring.
    Literal { source: String, needle: String },
}

impl SearchPattern {
    /// Never fails: malformed patterns degrade to a literal match.
    pub fn compile(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::MatchAll;
        }

        match RegexBuilder::new(raw).case_insensitive(true).build() {
            Ok(regex) => Self::Regex {
                source: raw.to_string(),
                regex,
            },
            Err(err) => {
                debug!(pattern = raw, %err, "search text is not a valid pattern; matching literally");
                Self::Literal {
                    source: raw.to_string(),
                    needle: raw.to_lowercase(),
                }
            }
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::MatchAll => "",
            Self::Regex { source, .. } | Self::Literal { source, .. } => source,
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll)
    }

    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            Self::MatchAll => true,
            Self::Regex { regex, .. } => regex.is_match(text),
            Self::Literal { needle, .. } => text.to_lowercase().contains(needle.as_str()),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.matches_text(&item.text)
    }
}

impl PartialEq for SearchPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MatchAll, Self::MatchAll) => true,
            (Self::Regex { source: a, .. }, Self::Regex { source: b, .. }) => a == b,
            (Self::Literal { source: a, .. }, Self::Literal { source: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for SearchPattern {}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
